//! Boundary rules for ISBN/RFC/PMID magic links.
//!
//! Magic links are recognized lexically, so a word character glued to either
//! end changes what the tokenizer sees: `IISBN 123` is no longer a magic
//! link, and `ISBN 1234567890` followed by another digit is a different
//! (invalid) number.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::meta::Syntax;
use crate::dom::{Document, NodeId};

use super::{Resolution, Variant};

static BAD_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w$").expect("magic link prefix pattern"));
static BAD_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w").expect("magic link suffix pattern"));

pub(crate) fn matches(doc: &Document, id: NodeId) -> Option<Variant> {
    (doc.element_name(id) == Some("a") && doc.meta(id).syntax() == Syntax::Magiclink)
        .then_some(Variant::MagicLink)
}

pub(crate) fn resolve(left: &str, right: &str) -> Resolution {
    Resolution {
        prefix: BAD_PREFIX.is_match(left),
        suffix: BAD_SUFFIX.is_match(right),
    }
}
