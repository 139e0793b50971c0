//! `@var` / `@source` doc-tag extraction
//!
//! Convenience for hosts that keep field declarations in documentation
//! comments. The registration API remains the source of truth; this only
//! pulls the raw strings out of a comment.

use once_cell::sync::Lazy;
use regex::Regex;

static VAR_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@var\s+((?:[\w?|\\<>]+(?:\[\])?)+)").expect("valid @var pattern")
});

static SOURCE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@source\s+((?:[\w?|\\<>]+(?:\[\])?)+)").expect("valid @source pattern")
});

/// Tags found in one field's documentation comment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocTags {
    /// Raw type declaration from `@var`
    pub var: Option<String>,
    /// Alternate input key from `@source`
    pub source: Option<String>,
}

impl DocTags {
    /// Extract the first `@var` and `@source` tags from `doc`
    pub fn parse(doc: &str) -> Self {
        Self {
            var: capture(&VAR_TAG, doc),
            source: capture(&SOURCE_TAG, doc),
        }
    }
}

fn capture(pattern: &Regex, doc: &str) -> Option<String> {
    pattern
        .captures(doc)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
