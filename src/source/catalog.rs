//! The fixed list of selectable news sources.
//!
//! Labels are what the selector shows; keys are what the upstream API
//! expects in its `sources` query parameter.

use std::fmt;

/// Opaque identifier of an upstream news source (e.g. `bbc-news`).
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct SourceKey(String);

impl SourceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Human-readable label → source key, in selector order.  The first entry is
/// the source shown when the headline screen opens.
pub const SOURCES: [(&str, &str); 4] = [
    ("BBC News", "bbc-news"),
    ("CNN", "cnn"),
    ("The Washington Post", "the-washington-post"),
    ("The Wall Street Journal", "the-wall-street-journal"),
];

/// Label of the default source.
pub fn default_label() -> &'static str {
    SOURCES[0].0
}

/// Key for a label, matched case-insensitively.
pub fn key_for_label(label: &str) -> Option<SourceKey> {
    SOURCES
        .iter()
        .find(|(l, _)| l.eq_ignore_ascii_case(label))
        .map(|(_, key)| SourceKey::new(*key))
}

/// Label for a key, if the key is one of the catalog's.
pub fn label_for_key(key: &SourceKey) -> Option<&'static str> {
    SOURCES
        .iter()
        .find(|(_, k)| *k == key.as_str())
        .map(|(label, _)| *label)
}
