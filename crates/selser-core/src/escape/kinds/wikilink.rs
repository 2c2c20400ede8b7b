//! Boundary rules for `[[…]]` internal links.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::{Document, NodeId};
use crate::escape::{Chunk, ChunkKind};
use crate::site::SiteConfig;

use super::{Resolution, Variant};

/// An odd run of `[` at the end of the left context. One more `[` pair and
/// the link's own `[[` would be misread as nested/external link syntax.
static OPEN_BRACKET_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^\[])(\[\[)*\[$").expect("open bracket run pattern"));

pub(crate) fn matches(doc: &Document, id: NodeId) -> Option<Variant> {
    let rel = doc.attr(id, "rel")?;
    rel.split_whitespace()
        .any(|t| t == "mw:WikiLink")
        .then_some(Variant::WikiLink)
}

pub(crate) fn resolve(chunk: &Chunk, left: &str, right: &str, site: &SiteConfig) -> Resolution {
    let prefix = OPEN_BRACKET_RUN.is_match(left) || site.ends_with_prefix(left);
    // A greedy chunk already owns its trail; checking the right context
    // again would double-escape it.
    let suffix = !chunk.greedy && site.starts_with_trail(right);
    Resolution { prefix, suffix }
}

/// Builds a wiki-link chunk from already-correct text, computing greediness:
/// when the text's trailing run after `]]` is entirely trail-eligible and the
/// text does not end in `]`, the chunk owns that trail and seals the escape
/// accumulator behind itself.
pub(crate) fn chunk_from_text(text: &str, node: NodeId, site: &SiteConfig) -> Chunk {
    let greedy = owns_trail(text, site);
    Chunk::specialized(text, ChunkKind::WikiLink)
        .with_node(node)
        .greedy(greedy)
}

fn owns_trail(text: &str, site: &SiteConfig) -> bool {
    if text.ends_with(']') {
        return false;
    }
    let Some(pos) = text.rfind("]]") else {
        return false;
    };
    let tail = &text[pos + 2..];
    !tail.is_empty() && site.trail_len(tail) == tail.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_link_is_not_greedy() {
        let site = SiteConfig::default();
        assert!(!owns_trail("[[Foo]]", &site));
    }

    #[test]
    fn trail_eligible_tail_is_greedy() {
        let site = SiteConfig::default();
        assert!(owns_trail("[[Foo]]s", &site));
        assert!(owns_trail("[[Foo|bar]]ing", &site));
    }

    #[test]
    fn non_trail_tail_is_not_greedy() {
        let site = SiteConfig::default();
        assert!(!owns_trail("[[Foo]]'s", &site));
        assert!(!owns_trail("[[Foo]]X", &site));
    }

    #[test]
    fn odd_bracket_runs_trigger_prefix() {
        assert!(OPEN_BRACKET_RUN.is_match("["));
        assert!(OPEN_BRACKET_RUN.is_match("foo["));
        assert!(OPEN_BRACKET_RUN.is_match("[[["));
        assert!(!OPEN_BRACKET_RUN.is_match("[["));
        assert!(!OPEN_BRACKET_RUN.is_match("foo"));
        assert!(!OPEN_BRACKET_RUN.is_match(""));
    }
}
