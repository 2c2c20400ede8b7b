//! Per-wiki lexical rules consumed by the boundary matchers.
//!
//! Link-trail and link-prefix eligibility is wiki-language-specific: some
//! languages glue trailing letters onto `]]`, others allow letters before
//! `[[`. The patterns live in site configuration so the escaping rules stay
//! generic.

use once_cell::sync::Lazy;
use regex::Regex;

/// English-style link trail: lowercase ASCII letters after `]]` are absorbed
/// into the rendered link text.
pub const DEFAULT_LINK_TRAIL: &str = "[a-z]+";

/// Characters MediaWiki allows in a page title.
pub const DEFAULT_LEGAL_TITLE: &str =
    r#"^[ %!"$&'()*,\-./0-9:;=?@A-Z\\^_`a-z~\x{0080}-\x{10FFFF}+]+$"#;

static DEFAULT_TRAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_LINK_TRAIL).expect("default link trail pattern"));
static DEFAULT_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_LEGAL_TITLE).expect("default legal title pattern"));

/// Compiled lexical rules for one wiki.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    link_trail: Regex,
    link_prefix: Option<Regex>,
    legal_title: Regex,
}

impl SiteConfig {
    /// Compiles a configuration from raw patterns.
    ///
    /// The trail pattern is matched against the text immediately after a
    /// link; only a match starting at offset 0 counts. The prefix pattern is
    /// matched against the text immediately before a link; only a match
    /// ending at the boundary counts. Patterns therefore need no anchors.
    pub fn new(
        link_trail: &str,
        link_prefix: Option<&str>,
        legal_title: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self::from_compiled(
            Regex::new(link_trail)?,
            link_prefix.map(Regex::new).transpose()?,
            Regex::new(legal_title)?,
        ))
    }

    /// Builds a configuration from already-compiled patterns, for callers
    /// that validate fields individually.
    pub fn from_compiled(
        link_trail: Regex,
        link_prefix: Option<Regex>,
        legal_title: Regex,
    ) -> Self {
        Self {
            link_trail,
            link_prefix,
            legal_title,
        }
    }

    /// Byte length of the trail-eligible run at the start of `right`, zero
    /// if the first character is not trail-eligible.
    pub fn trail_len(&self, right: &str) -> usize {
        match self.link_trail.find(right) {
            Some(m) if m.start() == 0 => m.end(),
            _ => 0,
        }
    }

    /// True if the text after a link would be absorbed as a link trail.
    pub fn starts_with_trail(&self, right: &str) -> bool {
        self.trail_len(right) > 0
    }

    /// True if the text before a link would be absorbed as a link prefix.
    pub fn ends_with_prefix(&self, left: &str) -> bool {
        let Some(re) = &self.link_prefix else {
            return false;
        };
        re.find_iter(left).any(|m| m.end() == left.len())
    }

    /// True if `title` contains only characters legal in a page title.
    pub fn is_legal_title(&self, title: &str) -> bool {
        !title.is_empty() && self.legal_title.is_match(title)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            link_trail: DEFAULT_TRAIL_RE.clone(),
            link_prefix: None,
            legal_title: DEFAULT_TITLE_RE.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_trail_matches_lowercase_run() {
        let site = SiteConfig::default();
        assert_eq!(site.trail_len("s rest"), 1);
        assert_eq!(site.trail_len("abc!"), 3);
        assert_eq!(site.trail_len("'s"), 0);
        assert_eq!(site.trail_len("Spain"), 0);
        assert!(!site.starts_with_trail(""));
    }

    #[test]
    fn trail_match_must_start_at_boundary() {
        let site = SiteConfig::default();
        // "1a" has a lowercase run, but not at the boundary.
        assert_eq!(site.trail_len("1a"), 0);
    }

    #[test]
    fn prefix_match_must_end_at_boundary() {
        let site = SiteConfig::new(DEFAULT_LINK_TRAIL, Some("-+"), DEFAULT_LEGAL_TITLE).unwrap();
        assert!(site.ends_with_prefix("foo-"));
        assert!(site.ends_with_prefix("--"));
        assert!(!site.ends_with_prefix("-foo"));
        assert!(!site.ends_with_prefix(""));
    }

    #[test]
    fn no_prefix_rule_means_nothing_matches() {
        let site = SiteConfig::default();
        assert!(!site.ends_with_prefix("foo-"));
    }

    #[test]
    fn legal_title_rejects_forbidden_characters() {
        let site = SiteConfig::default();
        assert!(site.is_legal_title("Main Page"));
        assert!(site.is_legal_title("Café"));
        assert!(!site.is_legal_title("a|b"));
        assert!(!site.is_legal_title("a[b]"));
        assert!(!site.is_legal_title(""));
    }
}
