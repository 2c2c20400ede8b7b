//! Selective serialization: walk the edited DOM and, for unmodified regions
//! with usable source ranges, splice the original source text back in
//! instead of regenerating wikitext. Everything else is re-emitted and the
//! combined chunk stream is routed through the escaping engine line by line.

pub(crate) mod dispatch;

use crate::diff::{DiffAnnotations, DiffMark, diff};
use crate::dom::{Document, NodeData, NodeId};
use crate::emit;
use crate::error::SerializeError;
use crate::escape::{Chunk, escape_line};
use crate::normalize::normalize;
use crate::site::SiteConfig;

/// Coarse resource limits, checked at traversal steps. Exceeding one aborts
/// the request with a typed error rather than emitting truncated output.
#[derive(Debug, Clone)]
pub struct Options {
    pub max_nodes: usize,
    pub max_output_bytes: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_nodes: 100_000,
            max_output_bytes: 4 * 1024 * 1024,
        }
    }
}

/// One serialization pass over one document. No state is shared between
/// passes; concurrent requests only share the read-only site configuration.
pub struct Serializer<'a> {
    site: &'a SiteConfig,
    opts: Options,
}

/// Per-request working state: counters plus the read-only inputs every
/// stage needs.
pub(crate) struct State<'a> {
    pub(crate) doc: &'a Document,
    pub(crate) ann: &'a DiffAnnotations,
    pub(crate) source: Option<&'a str>,
    pub(crate) site: &'a SiteConfig,
    opts: &'a Options,
    nodes_visited: usize,
    bytes_emitted: usize,
}

impl State<'_> {
    pub(crate) fn visit(&mut self) -> Result<(), SerializeError> {
        self.nodes_visited += 1;
        if self.nodes_visited > self.opts.max_nodes {
            return Err(SerializeError::ResourceLimitExceeded {
                what: "node",
                limit: self.opts.max_nodes,
            });
        }
        Ok(())
    }

    fn charge(&mut self, bytes: usize) -> Result<(), SerializeError> {
        self.bytes_emitted += bytes;
        if self.bytes_emitted > self.opts.max_output_bytes {
            return Err(SerializeError::ResourceLimitExceeded {
                what: "output byte",
                limit: self.opts.max_output_bytes,
            });
        }
        Ok(())
    }
}

/// Chunks for one escaping line.
pub(crate) type Line = Vec<Chunk>;

/// Accumulates chunks into lines. A line is the unit the escaping engine
/// resolves over; hard line breaks between block constructs end it.
pub(crate) struct LineBuilder {
    lines: Vec<Line>,
    current: Line,
}

impl LineBuilder {
    pub(crate) fn new() -> Self {
        Self {
            lines: Vec::new(),
            current: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, chunk: Chunk) {
        self.current.push(chunk);
    }

    /// Starts a new line. No-op when the current line is empty, so callers
    /// can break unconditionally before each block construct.
    pub(crate) fn break_line(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
    }

    pub(crate) fn finish(mut self) -> Vec<Line> {
        if !self.current.is_empty() {
            self.lines.push(self.current);
        }
        self.lines
    }
}

pub(crate) fn push_chunk(
    state: &mut State<'_>,
    lb: &mut LineBuilder,
    chunk: Chunk,
) -> Result<(), SerializeError> {
    state.charge(chunk.text.len())?;
    lb.push(chunk);
    Ok(())
}

impl<'a> Serializer<'a> {
    pub fn new(site: &'a SiteConfig) -> Self {
        Self {
            site,
            opts: Options::default(),
        }
    }

    pub fn with_options(site: &'a SiteConfig, opts: Options) -> Self {
        Self { site, opts }
    }

    /// Serializes `edited` to wikitext.
    ///
    /// With an original document and its source, unmodified regions are
    /// spliced from the source byte-for-byte. Without them the whole page is
    /// re-emitted: a known, accepted quality degradation, logged as a
    /// warning rather than failed.
    pub fn serialize(
        &self,
        edited: &Document,
        original: Option<&Document>,
        source: Option<&str>,
    ) -> Result<String, SerializeError> {
        let mut work = edited.clone();
        normalize(&mut work);

        let (ann, source) = match (original, source) {
            (Some(orig), Some(src)) => {
                // The differ must see both trees in canonical form; churn
                // present on only one side would read as an edit.
                let mut orig = orig.clone();
                normalize(&mut orig);
                (diff(&orig, &work), Some(src))
            }
            _ => {
                log::warn!(
                    "{}; falling back to full re-serialization",
                    SerializeError::MissingOriginalContent
                );
                (DiffAnnotations::all_modified(), None)
            }
        };

        let mut state = State {
            doc: &work,
            ann: &ann,
            source,
            site: self.site,
            opts: &self.opts,
            nodes_visited: 0,
            bytes_emitted: 0,
        };

        let mut regions = Vec::new();
        for &child in work.children(work.root()) {
            let mut lb = LineBuilder::new();
            serialize_any(&mut state, &mut lb, child)?;
            let text = lb
                .finish()
                .iter()
                .map(|l| escape_line(l, self.site))
                .collect::<Vec<_>>()
                .join("\n");
            regions.push(Region { text, node: child });
        }

        Ok(assemble(&work, source, &regions))
    }
}

struct Region {
    text: String,
    node: NodeId,
}

/// Serializes one node into the line builder: source reuse when the diff and
/// metadata allow it, fresh emission otherwise.
pub(crate) fn serialize_any(
    state: &mut State<'_>,
    lb: &mut LineBuilder,
    id: NodeId,
) -> Result<(), SerializeError> {
    state.visit()?;

    let NodeData::Element { .. } = state.doc.node(id).data else {
        return emit::emit_node(state, lb, id);
    };

    if is_block(state.doc, id) {
        lb.break_line();
    }

    match state.ann.mark(id) {
        DiffMark::Unmodified => {
            if try_reuse(state, lb, id)? {
                return Ok(());
            }
            // Unmodified but no usable range: nothing to splice.
            emit::emit_node(state, lb, id)
        }
        DiffMark::ChildrenModified => {
            if let Some((open, close)) = shell_slices(state, id) {
                if !open.is_empty() {
                    push_chunk(state, lb, Chunk::regular(open).with_node(id).from_selser())?;
                }
                for &c in state.doc.children(id) {
                    serialize_any(state, lb, c)?;
                }
                if !close.is_empty() {
                    push_chunk(
                        state,
                        lb,
                        Chunk::regular(close)
                            .with_node(id)
                            .from_selser()
                            .no_separator(),
                    )?;
                }
                Ok(())
            } else {
                emit::emit_node(state, lb, id)
            }
        }
        DiffMark::Modified => emit::emit_node(state, lb, id),
    }
}

/// Attempts whole-node source reuse. Returns false when there is no source,
/// no valid range, or the slice fails, so the caller can re-emit instead.
fn try_reuse(
    state: &mut State<'_>,
    lb: &mut LineBuilder,
    id: NodeId,
) -> Result<bool, SerializeError> {
    let Some(src) = state.source else {
        return Ok(false);
    };
    let Some(dsr) = state.doc.meta(id).valid_dsr() else {
        return Ok(false);
    };
    let Some(text) = dsr.slice(src) else {
        log::warn!("{}", SerializeError::InvalidSourceRange(dsr));
        return Ok(false);
    };
    for chunk in dispatch::from_reused_source(state.doc, text, id, state.site) {
        push_chunk(state, lb, chunk)?;
    }
    Ok(true)
}

/// The opening and closing syntax of a node, sliced from the source, for
/// reusing a node's own markup around re-serialized children.
fn shell_slices(state: &State<'_>, id: NodeId) -> Option<(String, String)> {
    let src = state.source?;
    let dsr = state.doc.meta(id).valid_dsr()?;
    let (inner_start, inner_end) = dsr.inner()?;
    let open = src.get(dsr.start..inner_start)?;
    let close = src.get(inner_end..dsr.end)?;
    Some((open.to_string(), close.to_string()))
}

fn is_block(doc: &Document, id: NodeId) -> bool {
    matches!(
        doc.element_name(id),
        Some(
            "p" | "li"
                | "ul"
                | "ol"
                | "dl"
                | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
                | "table"
                | "tr"
                | "div"
                | "blockquote"
                | "pre"
        )
    )
}

fn assemble(doc: &Document, source: Option<&str>, regions: &[Region]) -> String {
    let mut out = String::new();
    for (i, region) in regions.iter().enumerate() {
        if i > 0 {
            out.push_str(&separator(doc, source, &regions[i - 1], region));
        }
        out.push_str(&region.text);
    }
    out
}

/// Recovers the original whitespace between two regions when both carry
/// ranges; falls back to a structural default otherwise.
fn separator(doc: &Document, source: Option<&str>, prev: &Region, next: &Region) -> String {
    if let Some(src) = source
        && let (Some(pd), Some(nd)) = (
            doc.meta(prev.node).valid_dsr(),
            doc.meta(next.node).valid_dsr(),
        )
        && pd.end <= nd.start
        && let Some(gap) = src.get(pd.end..nd.start)
        && gap.chars().all(char::is_whitespace)
    {
        return gap.to_string();
    }
    default_separator(doc, prev.node, next.node)
}

fn default_separator(doc: &Document, prev: NodeId, next: NodeId) -> String {
    let both_paragraphs =
        doc.element_name(prev) == Some("p") && doc.element_name(next) == Some("p");
    if both_paragraphs {
        "\n\n".to_string()
    } else {
        "\n".to_string()
    }
}
