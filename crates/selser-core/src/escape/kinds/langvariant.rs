//! Boundary rules for `-{…}-` language-variant blocks.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::{Document, NodeId};

use super::{Resolution, Variant};

/// A `-` at the end of the left context abutting the block's own `-{` is the
/// one ambiguous boundary for this construct.
static BAD_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-$").expect("language variant prefix pattern"));

pub(crate) fn matches(doc: &Document, id: NodeId) -> Option<Variant> {
    let tf = doc.attr(id, "typeof")?;
    tf.split_whitespace()
        .any(|t| t == "mw:LanguageVariant")
        .then_some(Variant::LanguageVariant)
}

pub(crate) fn resolve(left: &str) -> Resolution {
    Resolution {
        prefix: BAD_PREFIX.is_match(left),
        suffix: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_dash_escapes() {
        assert!(resolve("foo-").prefix);
        assert!(!resolve("foo").prefix);
    }
}
