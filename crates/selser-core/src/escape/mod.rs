//! Constrained text and the line escaping engine.
//!
//! A [`Chunk`] is one atomic piece of output wikitext that is correct in
//! isolation, paired with the conditions under which a boundary escape must
//! be inserted before or after it so that concatenation stays unambiguous.
//! [`escape_line`] resolves those conditions left to right over one line;
//! escaping never looks across a hard line break.

pub(crate) mod kinds;

use crate::dom::NodeId;
use crate::site::SiteConfig;

/// Zero-width escape marker. Splits two adjacent fragments that would
/// otherwise be mis-parsed as one construct.
pub const NOWIKI: &str = "<nowiki/>";

/// Which grammar a chunk's text belongs to, and therefore which boundary
/// rules apply. A closed set: dispatch over it is explicit, not inherited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    /// Plain text or any construct with no boundary hazards.
    Regular,
    /// `[[…]]`, possibly with an absorbed link trail.
    WikiLink,
    /// `[url label]`. Deliberately has no boundary matchers; flanking
    /// brackets merge into doubled brackets, which is the fixed point the
    /// round-trip tests assert.
    ExtLink,
    /// A bare URL autolink. Whether the URL contains `(` changes which
    /// trailing punctuation the grammar would absorb.
    AutoUrl { has_open_paren: bool },
    /// ISBN/RFC/PMID-style autolink.
    MagicLink,
    /// `-{…}-` language-variant block.
    LanguageVariant,
}

/// One constrained piece of output wikitext.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub text: String,
    /// The node this chunk was emitted for. Separator logic anchors on it.
    pub node: Option<NodeId>,
    pub kind: ChunkKind,
    /// Escape string inserted before `text` when the kind's bad-prefix rule
    /// matches the finalized left context. `None` means this side never
    /// escapes, e.g. for interior fragments of a decomposed node.
    pub prefix_escape: Option<String>,
    /// Same, for the bad-suffix rule against the raw right context.
    pub suffix_escape: Option<String>,
    /// Text was reused from the original source rather than re-emitted.
    pub from_selser: bool,
    /// Suppress separator insertion before this chunk; set on all but the
    /// first fragment when one reused node is split into several chunks.
    pub suppress_separator: bool,
    /// This chunk's trailing boundary consumes adjacent raw characters (a
    /// link trail it already owns). After it is appended, the accumulated
    /// left context is sealed so later chunks cannot re-examine it.
    pub greedy: bool,
}

impl Chunk {
    pub fn regular(text: impl Into<String>) -> Self {
        Self::specialized(text, ChunkKind::Regular)
    }

    /// Creates a chunk with the default escape strings for its kind.
    pub fn specialized(text: impl Into<String>, kind: ChunkKind) -> Self {
        let (prefix_escape, suffix_escape) = match kind {
            ChunkKind::Regular | ChunkKind::ExtLink => (None, None),
            ChunkKind::WikiLink | ChunkKind::AutoUrl { .. } | ChunkKind::MagicLink => {
                (Some(NOWIKI.to_string()), Some(NOWIKI.to_string()))
            }
            ChunkKind::LanguageVariant => (Some(NOWIKI.to_string()), None),
        };
        Self {
            text: text.into(),
            node: None,
            kind,
            prefix_escape,
            suffix_escape,
            from_selser: false,
            suppress_separator: false,
            greedy: false,
        }
    }

    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    pub fn from_selser(mut self) -> Self {
        self.from_selser = true;
        self
    }

    pub fn no_separator(mut self) -> Self {
        self.suppress_separator = true;
        self
    }

    pub fn greedy(mut self, greedy: bool) -> Self {
        self.greedy = greedy;
        self
    }

    /// Disables the suffix escape. Used when the chunk's right side is
    /// interior to a larger reused region and already correct.
    pub fn protect_right(mut self) -> Self {
        self.suffix_escape = None;
        self
    }

    /// Disables the prefix escape, symmetric to [`Chunk::protect_right`].
    pub fn protect_left(mut self) -> Self {
        self.prefix_escape = None;
        self
    }
}

/// Resolves boundary escapes for one line of chunks and returns the final
/// text.
///
/// The accumulator is two buffers: `sealed` is immune to further mutation,
/// `pending` is the left context later chunks may still match against. A
/// greedy chunk moves everything accumulated so far into `sealed`, which is
/// what lets consecutive wiki-links share trail characters without an escape
/// between them: only the first link claims the trail, and nothing after it
/// can re-read the claimed text as its own prefix context.
pub fn escape_line(chunks: &[Chunk], site: &SiteConfig) -> String {
    let all: String = chunks.iter().map(|c| c.text.as_str()).collect();
    let mut pos = 0;
    let mut sealed = String::new();
    let mut pending = String::new();

    for chunk in chunks {
        // Drop this chunk's own text from the raw right context first; what
        // remains is the unescaped text of everything still to come.
        pos += chunk.text.len();
        let right = &all[pos..];

        let need = kinds::resolve(chunk, &pending, right, site);
        if need.prefix
            && let Some(p) = &chunk.prefix_escape
        {
            pending.push_str(p);
        }
        pending.push_str(&chunk.text);
        if need.suffix
            && let Some(s) = &chunk.suffix_escape
        {
            pending.push_str(s);
        }

        if chunk.greedy {
            sealed.push_str(&pending);
            pending.clear();
        }
    }

    sealed.push_str(&pending);
    sealed
}
