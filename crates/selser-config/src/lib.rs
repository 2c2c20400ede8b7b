//! Site profiles: the per-wiki linking rules the serializer needs, loaded
//! from a TOML file and compiled into a [`selser_core::SiteConfig`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read site profile at {profile_path}: {source}")]
    ProfileReadError {
        profile_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse site profile at {profile_path}: {source}")]
    ProfileParseError {
        profile_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid pattern in field {field}: {source}")]
    InvalidPattern {
        field: &'static str,
        source: regex::Error,
    },
}

/// Serialized form of a site's linking rules. Every field is optional; an
/// omitted field falls back to the English Wikipedia default.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SiteProfile {
    /// Pattern for characters a link trail may absorb, e.g. `[a-z]+`.
    pub link_trail: Option<String>,
    /// Pattern for characters a link prefix may absorb. Most wikis have
    /// none; Arabic-script wikis are the usual users.
    pub link_prefix: Option<String>,
    /// Pattern a link target must fully match to be a legal page title.
    pub legal_title: Option<String>,
}

impl SiteProfile {
    pub fn load_from_path<P: AsRef<Path>>(profile_path: P) -> Result<Option<Self>, ConfigError> {
        let profile_path = profile_path.as_ref();
        if !profile_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(profile_path).map_err(|source| {
            ConfigError::ProfileReadError {
                profile_path: profile_path.to_path_buf(),
                source,
            }
        })?;

        let profile: SiteProfile =
            toml::from_str(&content).map_err(|source| ConfigError::ProfileParseError {
                profile_path: profile_path.to_path_buf(),
                source,
            })?;

        Ok(Some(profile))
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, profile_path: P) -> anyhow::Result<()> {
        let profile_path = profile_path.as_ref();
        if let Some(parent) = profile_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(profile_path, content)?;
        Ok(())
    }

    /// Compiles the profile into the core configuration. Each pattern is
    /// compiled once; an invalid pattern names its field in the error.
    pub fn compile(&self) -> Result<selser_core::SiteConfig, ConfigError> {
        let trail = compile_field(
            "link_trail",
            self.link_trail
                .as_deref()
                .unwrap_or(selser_core::site::DEFAULT_LINK_TRAIL),
        )?;
        let prefix = self
            .link_prefix
            .as_deref()
            .map(|p| compile_field("link_prefix", p))
            .transpose()?;
        let title = compile_field(
            "legal_title",
            self.legal_title
                .as_deref()
                .unwrap_or(selser_core::site::DEFAULT_LEGAL_TITLE),
        )?;
        Ok(selser_core::SiteConfig::from_compiled(trail, prefix, title))
    }
}

fn compile_field(field: &'static str, pattern: &str) -> Result<regex::Regex, ConfigError> {
    regex::Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern { field, source })
}
