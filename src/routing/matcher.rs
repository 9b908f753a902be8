//! Path pattern matching.
//!
//! # Responsibilities
//! - Compile a path template with capture groups into an anchored regex
//! - Test a concrete request path against it
//! - Extract captured segments positionally
//!
//! # Design Decisions
//! - Templates are anchored at both ends: the whole path must match
//! - Captures are plain strings; typed decoding happens in `params`
//! - Optional groups that did not participate yield an empty string
//! - Compilation errors surface at registration, never at dispatch

use regex::Regex;
use thiserror::Error;

/// A malformed path template.
#[derive(Debug, Error)]
#[error("invalid route pattern {pattern:?}: {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// Segments captured from a matched path, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures(Vec<String>);

impl Captures {
    /// Captured segment at `index`, or `""` if the pattern has fewer groups.
    pub fn get(&self, index: usize) -> &str {
        self.0.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for Captures {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    source: String,
    regex: Regex,
}

impl PatternMatcher {
    /// Compile a template such as `/api/contents/(.+)/checkpoints`.
    pub fn new(pattern: impl Into<String>) -> Result<Self, PatternError> {
        let source = pattern.into();
        let regex = Regex::new(&format!("^(?:{})$", source)).map_err(|e| PatternError {
            pattern: source.clone(),
            source: e,
        })?;
        Ok(Self { source, regex })
    }

    /// The template as it was registered.
    pub fn pattern(&self) -> &str {
        &self.source
    }

    /// Returns true if the whole path matches.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Match `path` and extract every capture group.
    pub fn captures(&self, path: &str) -> Option<Captures> {
        let caps = self.regex.captures(path)?;
        let segments = caps
            .iter()
            .skip(1)
            .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
            .collect::<Vec<_>>();
        Some(Captures(segments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchored_match() {
        let matcher = PatternMatcher::new("/api/sessions").unwrap();
        assert!(matcher.is_match("/api/sessions"));
        assert!(!matcher.is_match("/api/sessions/abc"));
        assert!(!matcher.is_match("/prefix/api/sessions"));
    }

    #[test]
    fn test_trailing_remainder_may_be_empty() {
        let matcher = PatternMatcher::new("/api/contents(.*)").unwrap();

        let caps = matcher.captures("/api/contents").unwrap();
        assert_eq!(caps.len(), 1);
        assert_eq!(caps.get(0), "");

        let caps = matcher.captures("/api/contents/dir/nb.ipynb").unwrap();
        assert_eq!(caps.get(0), "/dir/nb.ipynb");
    }

    #[test]
    fn test_captures_in_order() {
        let matcher = PatternMatcher::new("/api/contents/(.+)/checkpoints/(.*)").unwrap();
        let caps = matcher
            .captures("/api/contents/a/b.txt/checkpoints/42")
            .unwrap();
        assert_eq!(caps.into_vec(), vec!["a/b.txt".to_string(), "42".to_string()]);
    }

    #[test]
    fn test_nested_optional_groups() {
        let matcher =
            PatternMatcher::new("/api/settings/((?:@([^/]+?)[/])?([^/]+?):([^:]+))$").unwrap();

        let caps = matcher
            .captures("/api/settings/@jupyterlab/apputils-extension:themes")
            .unwrap();
        assert_eq!(caps.get(0), "@jupyterlab/apputils-extension:themes");
        assert_eq!(caps.get(1), "jupyterlab");

        // Scope group does not participate
        let caps = matcher.captures("/api/settings/plain:plugin").unwrap();
        assert_eq!(caps.get(0), "plain:plugin");
        assert_eq!(caps.get(1), "");
        assert_eq!(caps.get(2), "plain");
    }

    #[test]
    fn test_malformed_pattern() {
        let err = PatternMatcher::new("/api/(unclosed").unwrap_err();
        assert_eq!(err.pattern, "/api/(unclosed");
        assert!(err.to_string().contains("/api/(unclosed"));
    }

    #[test]
    fn test_out_of_range_capture_is_empty() {
        let caps = Captures::default();
        assert!(caps.is_empty());
        assert_eq!(caps.get(3), "");
    }
}
