//! Bracketed external links `[url label]`.
//!
//! This variant deliberately has no boundary matchers: a literal `[` before
//! or `]` after merges into doubled brackets. That output round-trips to
//! itself and is asserted by the test fixtures, so it stays as-is.

use crate::dom::{Document, NodeId};

use super::Variant;

pub(crate) fn matches(doc: &Document, id: NodeId) -> Option<Variant> {
    let rel = doc.attr(id, "rel")?;
    rel.split_whitespace()
        .any(|t| t == "mw:ExtLink")
        .then_some(Variant::ExtLink)
}
