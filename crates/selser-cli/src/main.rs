use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use selser_core::{Document, Serializer, SiteConfig};

/// Serialize an edited document tree back to wikitext, reusing the original
/// source for unmodified regions when the original parse is provided.
#[derive(Parser, Debug)]
#[command(name = "selser", version, about)]
struct Args {
    /// Edited document tree, in the JSON interchange form.
    edited: PathBuf,

    /// Original document tree the edit started from.
    #[arg(long)]
    original: Option<PathBuf>,

    /// Original wikitext source the tree was parsed from.
    #[arg(long)]
    source: Option<PathBuf>,

    /// Site profile TOML; defaults to English Wikipedia rules.
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Write output here instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let edited_json = std::fs::read_to_string(&args.edited)
        .with_context(|| format!("reading edited tree {}", args.edited.display()))?;
    let edited = Document::from_json(&edited_json)
        .with_context(|| format!("parsing edited tree {}", args.edited.display()))?;

    let original = args
        .original
        .as_ref()
        .map(|path| -> Result<Document> {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading original tree {}", path.display()))?;
            Document::from_json(&json)
                .with_context(|| format!("parsing original tree {}", path.display()))
        })
        .transpose()?;

    let source = args
        .source
        .as_ref()
        .map(|path| {
            std::fs::read_to_string(path)
                .with_context(|| format!("reading source {}", path.display()))
        })
        .transpose()?;

    let site = load_site(args.profile.as_deref())?;

    let wikitext = Serializer::new(&site)
        .serialize(&edited, original.as_ref(), source.as_deref())
        .context("serializing document")?;

    match &args.output {
        Some(path) => std::fs::write(path, wikitext)
            .with_context(|| format!("writing output {}", path.display()))?,
        None => println!("{wikitext}"),
    }
    Ok(())
}

fn load_site(profile: Option<&std::path::Path>) -> Result<SiteConfig> {
    let Some(path) = profile else {
        return Ok(SiteConfig::default());
    };
    let loaded = selser_config::SiteProfile::load_from_path(path)?;
    match loaded {
        Some(profile) => Ok(profile.compile()?),
        None => {
            log::warn!("site profile {} not found, using defaults", path.display());
            Ok(SiteConfig::default())
        }
    }
}
