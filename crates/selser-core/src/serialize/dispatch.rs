//! Turns a reused source slice into constrained chunks.
//!
//! A reused slice is correct in isolation but its edges still face whatever
//! the serializer puts next to them. When the node is a known construct the
//! whole slice becomes one specialized chunk. Otherwise the slice is
//! decomposed structurally: a child whose range starts at the node's start
//! (or ends at its end) contributes the node's edge, so that child's boundary
//! rules apply there, while everything interior is protected from escaping.

use crate::dom::{Document, NodeId};
use crate::escape::{Chunk, kinds};
use crate::site::SiteConfig;

pub(crate) fn from_reused_source(
    doc: &Document,
    text: &str,
    node: NodeId,
    site: &SiteConfig,
) -> Vec<Chunk> {
    let mut chunks = decompose(doc, text, node, site);
    for c in &mut chunks {
        c.from_selser = true;
    }
    if let Some(first) = chunks.first_mut() {
        first.node = Some(node);
        first.suppress_separator = false;
    }
    for c in chunks.iter_mut().skip(1) {
        c.suppress_separator = true;
    }
    chunks
}

fn decompose(doc: &Document, text: &str, node: NodeId, site: &SiteConfig) -> Vec<Chunk> {
    if let Some(variant) = kinds::match_variant(doc, node) {
        return vec![kinds::chunk_for(variant, text, node, site)];
    }
    structural(doc, text, node, site)
}

/// Splits `text` into edge chunks owned by boundary-sharing children plus a
/// regular middle. Children that do not touch an edge stay inside the middle;
/// their boundaries were already resolved when the source was first written.
fn structural(doc: &Document, text: &str, node: NodeId, site: &SiteConfig) -> Vec<Chunk> {
    let Some(dsr) = doc.meta(node).valid_dsr() else {
        return vec![Chunk::regular(text).with_node(node)];
    };
    let children = doc.children(node);
    let mut head_chunks = Vec::new();
    let mut tail_chunks = Vec::new();
    let mut mid_start = 0;
    let mut mid_end = text.len();

    if let Some(&first) = children.first()
        && let Some(cdsr) = doc.meta(first).valid_dsr()
        && cdsr.start == dsr.start
    {
        let len = clamp_head(cdsr.len(), text);
        head_chunks = decompose(doc, &text[..len], first, site)
            .into_iter()
            .map(Chunk::protect_right)
            .collect();
        mid_start = len;
    }

    if let Some(&last) = children.last()
        && (children.len() > 1 || head_chunks.is_empty())
        && let Some(cdsr) = doc.meta(last).valid_dsr()
        && cdsr.end == dsr.end
    {
        let start = clamp_tail(cdsr.len(), mid_start, text);
        tail_chunks = decompose(doc, &text[start..], last, site)
            .into_iter()
            .map(Chunk::protect_left)
            .collect();
        mid_end = start;
    }

    let mut out = head_chunks;
    if mid_start < mid_end {
        out.push(Chunk::regular(&text[mid_start..mid_end]).with_node(node));
    }
    out.extend(tail_chunks);
    if out.is_empty() {
        out.push(Chunk::regular(text).with_node(node));
    }
    out
}

/// Clamps a head-child length to the available text and to a character
/// boundary. A length that overruns means the recorded ranges disagree with
/// the source; reuse proceeds on the truncated slice.
fn clamp_head(want: usize, text: &str) -> usize {
    let mut len = want;
    if len > text.len() {
        log::warn!(
            "child range length {want} exceeds reused slice length {}; clamping",
            text.len()
        );
        len = text.len();
    }
    while len > 0 && !text.is_char_boundary(len) {
        len -= 1;
    }
    len
}

/// Start offset for a tail child of length `want`, clamped so it never
/// overlaps the consumed head and always lands on a character boundary.
fn clamp_tail(want: usize, mid_start: usize, text: &str) -> usize {
    let avail = text.len() - mid_start;
    let mut len = want;
    if len > avail {
        log::warn!("child range length {want} exceeds remaining slice length {avail}; clamping");
        len = avail;
    }
    let mut start = text.len() - len;
    while start < text.len() && !text.is_char_boundary(start) {
        start += 1;
    }
    start
}
