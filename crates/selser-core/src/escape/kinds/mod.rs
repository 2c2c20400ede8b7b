//! Per-variant boundary rules and the ordered variant registry.
//!
//! Each variant contributes a node matcher (does this DOM node serialize as
//! this construct?) and a resolver (given left/right context, which boundary
//! escapes fire?). Dispatch over reused source text walks [`VARIANTS`] in
//! order and takes the first match, most specific construct first.

pub(crate) mod autourl;
pub(crate) mod extlink;
pub(crate) mod langvariant;
pub(crate) mod magiclink;
pub(crate) mod wikilink;

use crate::dom::{Document, NodeId};
use crate::site::SiteConfig;

use super::{Chunk, ChunkKind};

/// Which boundary escapes a chunk needs at its current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Resolution {
    pub prefix: bool,
    pub suffix: bool,
}

impl Resolution {
    pub(crate) fn none() -> Self {
        Self::default()
    }
}

/// The constructs a reused node can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Variant {
    WikiLink,
    ExtLink,
    AutoUrl,
    MagicLink,
    LanguageVariant,
}

type Matcher = fn(&Document, NodeId) -> Option<Variant>;

/// First matching variant wins. Ordered most specific first: magic links and
/// bare URLs are external-link nodes with extra constraints, so they must be
/// tried before the generic external-link match.
pub(crate) const VARIANTS: &[Matcher] = &[
    langvariant::matches,
    magiclink::matches,
    autourl::matches,
    extlink::matches,
    wikilink::matches,
];

pub(crate) fn match_variant(doc: &Document, id: NodeId) -> Option<Variant> {
    VARIANTS.iter().find_map(|m| m(doc, id))
}

/// Builds the specialized chunk for `variant` from already-correct text.
pub(crate) fn chunk_for(variant: Variant, text: &str, node: NodeId, site: &SiteConfig) -> Chunk {
    match variant {
        Variant::WikiLink => wikilink::chunk_from_text(text, node, site),
        Variant::ExtLink => Chunk::specialized(text, ChunkKind::ExtLink).with_node(node),
        Variant::AutoUrl => autourl::chunk_from_text(text, node),
        Variant::MagicLink => Chunk::specialized(text, ChunkKind::MagicLink).with_node(node),
        Variant::LanguageVariant => {
            Chunk::specialized(text, ChunkKind::LanguageVariant).with_node(node)
        }
    }
}

/// Applies the variant's bad-prefix/bad-suffix rules.
pub(crate) fn resolve(chunk: &Chunk, left: &str, right: &str, site: &SiteConfig) -> Resolution {
    match chunk.kind {
        ChunkKind::Regular | ChunkKind::ExtLink => Resolution::none(),
        ChunkKind::WikiLink => wikilink::resolve(chunk, left, right, site),
        ChunkKind::AutoUrl { has_open_paren } => {
            autourl::resolve(chunk, left, right, has_open_paren)
        }
        ChunkKind::MagicLink => magiclink::resolve(left, right),
        ChunkKind::LanguageVariant => langvariant::resolve(left),
    }
}
