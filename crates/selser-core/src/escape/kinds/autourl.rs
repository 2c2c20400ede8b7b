//! Boundary rules for bare URL autolinks.
//!
//! The free-link grammar keeps consuming characters after the URL, then
//! strips certain trailing punctuation. A trailing `)` is stripped only when
//! the URL itself contains no `(`, so the bad-suffix rule depends on the
//! chunk text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::meta::Syntax;
use crate::dom::{Document, NodeId};
use crate::escape::{Chunk, ChunkKind};

use super::{Resolution, Variant};

/// A word character directly before the protocol keeps the URL from being
/// recognized as an autolink at all.
static BAD_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w$").expect("autourl prefix pattern"));

/// Characters the grammar would absorb into the URL. Strippable trailing
/// punctuation (`,;.:!?` and, for parenthesis-free URLs, `)`) is safe: the
/// parser gives it back.
static BAD_SUFFIX_PLAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[^\s<>"\[\],;.:!?)]"#).expect("autourl suffix pattern"));
static BAD_SUFFIX_PAREN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[^\s<>"\[\],;.:!?]"#).expect("autourl suffix pattern"));

/// A numeric character reference left open at the end of the chunk...
static DANGLING_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#x?[0-9A-Fa-f]*$").expect("dangling entity pattern"));
/// ...which the immediate right context could close.
static ENTITY_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Fa-f]*;").expect("entity tail pattern"));

pub(crate) fn matches(doc: &Document, id: NodeId) -> Option<Variant> {
    let rel = doc.attr(id, "rel")?;
    if !rel.split_whitespace().any(|t| t == "mw:ExtLink") {
        return None;
    }
    (doc.meta(id).syntax() == Syntax::Url).then_some(Variant::AutoUrl)
}

pub(crate) fn resolve(chunk: &Chunk, left: &str, right: &str, has_open_paren: bool) -> Resolution {
    let prefix = BAD_PREFIX.is_match(left);

    let bad_suffix: &Regex = if has_open_paren {
        &BAD_SUFFIX_PAREN
    } else {
        &BAD_SUFFIX_PLAIN
    };
    let mut suffix = bad_suffix.is_match(right);

    // Guard against an entity forming across the chunk boundary: the generic
    // matcher treats a digit run ending in `;` as strippable text, but glued
    // to a dangling `&#…` it would decode as a character reference.
    if !suffix && DANGLING_ENTITY.is_match(&chunk.text) && ENTITY_TAIL.is_match(right) {
        suffix = true;
    }

    Resolution { prefix, suffix }
}

pub(crate) fn chunk_from_text(text: &str, node: NodeId) -> Chunk {
    let kind = ChunkKind::AutoUrl {
        has_open_paren: text.contains('('),
    };
    Chunk::specialized(text, kind).with_node(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str) -> Chunk {
        let kind = ChunkKind::AutoUrl {
            has_open_paren: text.contains('('),
        };
        Chunk::specialized(text, kind)
    }

    fn resolve_for(text: &str, left: &str, right: &str) -> Resolution {
        let c = chunk(text);
        let ChunkKind::AutoUrl { has_open_paren } = c.kind else {
            unreachable!()
        };
        resolve(&c, left, right, has_open_paren)
    }

    #[test]
    fn word_characters_on_both_sides_escape() {
        let r = resolve_for("https://example.com", "foo", "bar");
        assert!(r.prefix);
        assert!(r.suffix);
    }

    #[test]
    fn parens_around_plain_url_are_safe() {
        let r = resolve_for("https://example.com", "(", ")");
        assert!(!r.prefix);
        assert!(!r.suffix);
    }

    #[test]
    fn close_paren_after_paren_url_escapes() {
        let r = resolve_for("https://example.com/foo(bar", "", ")");
        assert!(r.suffix);
    }

    #[test]
    fn strippable_punctuation_is_safe() {
        for p in [".", ",", ";", ":", "!", "?"] {
            let r = resolve_for("https://example.com", "", p);
            assert!(!r.suffix, "{p:?} should be strippable");
        }
    }

    #[test]
    fn dangling_entity_forces_suffix_escape() {
        // A bare ";" is safe by the generic rule, but it would close the
        // chunk's open "&#x012" into a character reference.
        let r = resolve_for("https://example.com/x&#x012", "", "; rest");
        assert!(r.suffix);
    }

    #[test]
    fn completed_entity_in_chunk_is_not_dangling() {
        let r = resolve_for("https://example.com/x&#x012;", "", "; rest");
        assert!(!r.suffix);
    }

    #[test]
    fn hex_tail_after_bare_entity_start_is_escaped() {
        // "x12;" would complete the chunk's "&#" into a reference, but the
        // generic rule already rejects a leading word character, so the
        // entity guard never needs to see this shape.
        let r = resolve_for("https://example.com/x&#", "", "x12;");
        assert!(r.suffix);
    }

    #[test]
    fn semicolon_without_dangling_entity_is_safe() {
        let r = resolve_for("https://example.com", "", "; rest");
        assert!(!r.suffix);
    }
}
