//! Fresh wikitext emission, used for nodes the differ marked modified and
//! for anything without a usable source range.
//!
//! Children are routed back through the selective walk, so an unmodified
//! child inside a re-emitted parent still gets its source text spliced in.
//! Elements with no wikitext-native form fall back to literal HTML tags.

use crate::dom::meta::Syntax;
use crate::dom::{Document, NodeData, NodeId};
use crate::error::SerializeError;
use crate::escape::kinds::{self, Variant, autourl, wikilink};
use crate::escape::{Chunk, ChunkKind};
use crate::serialize::{LineBuilder, State, push_chunk, serialize_any};

/// Elements with no closing tag in the HTML fallback.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "link", "meta", "wbr"];

pub(crate) fn emit_node(
    state: &mut State<'_>,
    lb: &mut LineBuilder,
    id: NodeId,
) -> Result<(), SerializeError> {
    let doc = state.doc;
    match &doc.node(id).data {
        NodeData::Text(t) => push_chunk(state, lb, Chunk::regular(t.as_str()).with_node(id)),
        NodeData::Comment(t) => push_chunk(
            state,
            lb,
            Chunk::regular(format!("<!--{t}-->")).with_node(id),
        ),
        NodeData::Element { name, .. } => {
            let name = name.clone();
            emit_element(state, lb, id, &name)
        }
    }
}

pub(crate) fn emit_children(
    state: &mut State<'_>,
    lb: &mut LineBuilder,
    id: NodeId,
) -> Result<(), SerializeError> {
    for &c in state.doc.children(id) {
        serialize_any(state, lb, c)?;
    }
    Ok(())
}

fn emit_element(
    state: &mut State<'_>,
    lb: &mut LineBuilder,
    id: NodeId,
    name: &str,
) -> Result<(), SerializeError> {
    let doc = state.doc;
    match name {
        "body" | "p" => emit_children(state, lb, id),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = (name.as_bytes()[1] - b'0') as usize;
            let marker = "=".repeat(level);
            push_chunk(state, lb, Chunk::regular(marker.as_str()).with_node(id))?;
            emit_children(state, lb, id)?;
            push_chunk(state, lb, Chunk::regular(marker).with_node(id))
        }
        "b" => emit_wrapped(state, lb, id, "'''"),
        "i" => emit_wrapped(state, lb, id, "''"),
        "ul" | "ol" => emit_children(state, lb, id),
        "li" => {
            let marker = format!("{} ", list_prefix(doc, id));
            push_chunk(state, lb, Chunk::regular(marker).with_node(id))?;
            emit_children(state, lb, id)
        }
        "a" => emit_link(state, lb, id),
        "span" if is_language_variant(doc, id) => {
            let text = format!("-{{{}}}-", doc.text_content(id));
            push_chunk(
                state,
                lb,
                Chunk::specialized(text, ChunkKind::LanguageVariant).with_node(id),
            )
        }
        _ => emit_html(state, lb, id, name),
    }
}

fn emit_wrapped(
    state: &mut State<'_>,
    lb: &mut LineBuilder,
    id: NodeId,
    quotes: &str,
) -> Result<(), SerializeError> {
    push_chunk(state, lb, Chunk::regular(quotes).with_node(id))?;
    emit_children(state, lb, id)?;
    push_chunk(state, lb, Chunk::regular(quotes).with_node(id))
}

fn is_language_variant(doc: &Document, id: NodeId) -> bool {
    doc.attr(id, "typeof")
        .is_some_and(|tf| tf.split_whitespace().any(|t| t == "mw:LanguageVariant"))
}

/// Bullet run for a list item, derived from its list ancestry so nested
/// items work whether the whole list or a single item is re-emitted.
fn list_prefix(doc: &Document, li: NodeId) -> String {
    let mut markers = Vec::new();
    let mut cur = doc.parent(li);
    while let Some(n) = cur {
        match doc.element_name(n) {
            Some("ul") => markers.push('*'),
            Some("ol") => markers.push('#'),
            Some("li") => {}
            _ => break,
        }
        cur = doc.parent(n);
    }
    markers.iter().rev().collect()
}

fn emit_link(
    state: &mut State<'_>,
    lb: &mut LineBuilder,
    id: NodeId,
) -> Result<(), SerializeError> {
    let doc = state.doc;
    let site = state.site;
    match kinds::match_variant(doc, id) {
        Some(Variant::WikiLink) => {
            let Some(href) = doc.attr(id, "href") else {
                return unsupported(state, lb, id, "a");
            };
            let target = href.strip_prefix("./").unwrap_or(href).to_string();
            let label = doc.text_content(id);
            if !site.is_legal_title(&target) {
                log::warn!("link target {target:?} is not a legal title; emitting label text");
                return push_chunk(state, lb, Chunk::regular(label).with_node(id));
            }
            let piped = doc.meta(id).syntax() == Syntax::Piped || label != target;
            let text = if piped && !label.is_empty() {
                format!("[[{target}|{label}]]")
            } else {
                format!("[[{target}]]")
            };
            push_chunk(state, lb, wikilink::chunk_from_text(&text, id, site))
        }
        Some(Variant::AutoUrl) => {
            let url = doc
                .attr(id, "href")
                .map(str::to_string)
                .unwrap_or_else(|| doc.text_content(id));
            push_chunk(state, lb, autourl::chunk_from_text(&url, id))
        }
        Some(Variant::MagicLink) => push_chunk(
            state,
            lb,
            Chunk::specialized(doc.text_content(id), ChunkKind::MagicLink).with_node(id),
        ),
        Some(Variant::ExtLink) => {
            let Some(href) = doc.attr(id, "href") else {
                return unsupported(state, lb, id, "a");
            };
            let label = doc.text_content(id);
            let text = if label.is_empty() {
                format!("[{href}]")
            } else {
                format!("[{href} {label}]")
            };
            push_chunk(
                state,
                lb,
                Chunk::specialized(text, ChunkKind::ExtLink).with_node(id),
            )
        }
        Some(Variant::LanguageVariant) | None => unsupported(state, lb, id, "a"),
    }
}

/// Last resort for a node we have no rule for: keep the text content so the
/// page stays readable, and say so in the log.
fn unsupported(
    state: &mut State<'_>,
    lb: &mut LineBuilder,
    id: NodeId,
    name: &str,
) -> Result<(), SerializeError> {
    log::warn!(
        "{}; emitting text content",
        SerializeError::UnsupportedConstruct(name.to_string())
    );
    let text = state.doc.text_content(id);
    push_chunk(state, lb, Chunk::regular(text).with_node(id))
}

fn emit_html(
    state: &mut State<'_>,
    lb: &mut LineBuilder,
    id: NodeId,
    name: &str,
) -> Result<(), SerializeError> {
    let doc = state.doc;
    let mut open = format!("<{name}");
    if let NodeData::Element { attrs, .. } = &doc.node(id).data {
        for (k, v) in attrs {
            if k.starts_with("data-selser-") {
                continue;
            }
            open.push_str(&format!(
                " {k}=\"{}\"",
                html_escape::encode_double_quoted_attribute(v)
            ));
        }
    }
    if doc.children(id).is_empty() && VOID_ELEMENTS.contains(&name) {
        open.push_str("/>");
        return push_chunk(state, lb, Chunk::regular(open).with_node(id));
    }
    open.push('>');
    push_chunk(state, lb, Chunk::regular(open).with_node(id))?;
    emit_children(state, lb, id)?;
    push_chunk(
        state,
        lb,
        Chunk::regular(format!("</{name}>")).with_node(id),
    )
}
