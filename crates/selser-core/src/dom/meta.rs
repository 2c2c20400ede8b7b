use serde::{Deserialize, Serialize};

/// Attribute that carries the JSON-encoded [`NodeMeta`] bag on an element.
///
/// Only this module reads or writes the encoding; everything else works with
/// the decoded struct.
pub const META_ATTR: &str = "data-selser-meta";

/// A byte range `[start, end)` into the original wikitext source, plus the
/// widths of the node's opening and closing syntax (`[[` is 2, `'''` is 3).
///
/// Offsets index bytes, not characters. Slicing the source with a valid range
/// reproduces the exact text the node was parsed from, which is what makes
/// selective reuse lossless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRange {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
    /// Byte width of the opening syntax at `start`.
    pub open_width: usize,
    /// Byte width of the closing syntax ending at `end`.
    pub close_width: usize,
}

impl SourceRange {
    pub fn new(start: usize, end: usize, open_width: usize, close_width: usize) -> Self {
        Self {
            start,
            end,
            open_width,
            close_width,
        }
    }

    /// Returns the length in bytes. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// A range is usable only if it is non-inverted and the declared syntax
    /// widths fit inside it.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.start <= self.end && self.open_width + self.close_width <= self.len()
    }

    /// Slices `source` at this range.
    ///
    /// Returns `None` when the range is invalid, out of bounds, or does not
    /// fall on UTF-8 boundaries. Callers treat `None` as "no range" and fall
    /// back to re-emission rather than failing the request.
    pub fn slice(self, source: &str) -> Option<&str> {
        if !self.is_valid() {
            return None;
        }
        source.get(self.start..self.end)
    }

    /// The byte span of the node's content, between the opening and closing
    /// syntax. `None` if the range is invalid.
    pub fn inner(self) -> Option<(usize, usize)> {
        if !self.is_valid() {
            return None;
        }
        Some((self.start + self.open_width, self.end - self.close_width))
    }
}

/// The syntax the original author used for a construct, recorded at parse
/// time so serialization can reproduce it instead of picking a canonical
/// form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Syntax {
    /// `[[Target]]` with no pipe.
    Simple,
    /// `[[Target|label]]`.
    Piped,
    /// A bare URL autolink, `https://…` with no brackets.
    Url,
    /// ISBN/RFC/PMID-style magic link.
    Magiclink,
    /// Written as literal HTML in the wikitext.
    Html,
    /// Anything this build does not recognize. Decoding never fails on an
    /// unknown style; the node just gets no style-specific treatment.
    #[default]
    Unknown,
}

impl From<String> for Syntax {
    fn from(s: String) -> Self {
        match s.as_str() {
            "simple" => Syntax::Simple,
            "piped" => Syntax::Piped,
            "url" => Syntax::Url,
            "magiclink" => Syntax::Magiclink,
            "html" => Syntax::Html,
            _ => Syntax::Unknown,
        }
    }
}

/// Per-node parse metadata, produced once at parse time and read-only during
/// serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMeta {
    /// Byte span of this node in the original source, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsr: Option<SourceRange>,
    /// Original syntax style, if the construct has variants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syntax: Option<Syntax>,
    /// The tree builder synthesized this node's opening tag; there is no
    /// corresponding source text for it.
    #[serde(default)]
    pub auto_inserted_start: bool,
    /// Same, for the closing tag.
    #[serde(default)]
    pub auto_inserted_end: bool,
}

impl NodeMeta {
    /// Returns the node's source range if present and valid.
    ///
    /// An invalid range (inverted, or widths that do not fit) is logged and
    /// treated as absent, so callers degrade to re-emission instead of
    /// slicing with garbage offsets.
    pub fn valid_dsr(&self) -> Option<SourceRange> {
        match self.dsr {
            Some(r) if r.is_valid() => Some(r),
            Some(r) => {
                log::warn!("dropping invalid source range {r:?}");
                None
            }
            None => None,
        }
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax.unwrap_or_default()
    }
}

/// Decodes a metadata bag from its attribute representation.
pub fn decode(attr_value: &str) -> Result<NodeMeta, serde_json::Error> {
    serde_json::from_str(attr_value)
}

/// Encodes a metadata bag into its attribute representation.
pub fn encode(meta: &NodeMeta) -> Result<String, serde_json::Error> {
    serde_json::to_string(meta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_saturates_on_inverted_range() {
        let r = SourceRange::new(10, 4, 0, 0);
        assert_eq!(r.len(), 0);
        assert!(!r.is_valid());
    }

    #[test]
    fn widths_must_fit_inside_range() {
        assert!(SourceRange::new(0, 7, 2, 2).is_valid());
        assert!(!SourceRange::new(0, 3, 2, 2).is_valid());
    }

    #[test]
    fn slice_rejects_out_of_bounds() {
        let src = "hello";
        assert_eq!(SourceRange::new(0, 5, 0, 0).slice(src), Some("hello"));
        assert_eq!(SourceRange::new(2, 9, 0, 0).slice(src), None);
        assert_eq!(SourceRange::new(4, 2, 0, 0).slice(src), None);
    }

    #[test]
    fn slice_rejects_non_utf8_boundary() {
        let src = "a\u{00e9}b"; // é is two bytes
        assert_eq!(SourceRange::new(0, 2, 0, 0).slice(src), None);
        assert_eq!(SourceRange::new(0, 3, 0, 0).slice(src), Some("aé"));
    }

    #[test]
    fn inner_strips_syntax_widths() {
        let r = SourceRange::new(6, 13, 2, 2); // [[Foo]]
        assert_eq!(r.inner(), Some((8, 11)));
    }

    #[test]
    fn valid_dsr_drops_invalid_range() {
        let meta = NodeMeta {
            dsr: Some(SourceRange::new(9, 3, 0, 0)),
            ..Default::default()
        };
        assert_eq!(meta.valid_dsr(), None);
    }

    #[test]
    fn bag_round_trips() {
        let meta = NodeMeta {
            dsr: Some(SourceRange::new(6, 13, 2, 2)),
            syntax: Some(Syntax::Piped),
            auto_inserted_start: false,
            auto_inserted_end: true,
        };
        let encoded = encode(&meta).unwrap();
        assert_eq!(decode(&encoded).unwrap(), meta);
    }

    #[test]
    fn decode_tolerates_unknown_syntax() {
        let meta = decode(r#"{"syntax":"hologram"}"#).unwrap();
        assert_eq!(meta.syntax(), Syntax::Unknown);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode("not json").is_err());
    }
}
