//! The core data type shared by every headline source.
//!
//! `Article` is the value the fetch pipeline orders and publishes.  Source
//! implementations decode their wire format into `Article`s so the rest of
//! the application (ordering, coordinator, rendering) stays source-agnostic.
//!
//! ## For contributors
//!
//! The serde attributes below follow the newsapi.org `top-headlines` payload.
//! A source with a different wire format should decode into its own private
//! structs and convert, rather than piling more renames onto this type.

use serde::{Deserialize, Deserializer};

/// A single news headline, immutable once constructed.
///
/// `published_at` is kept as the raw text the upstream sent; it is only
/// interpreted by [`crate::timestamp::parse`] when the list is ordered, so a
/// malformed date never prevents the article itself from being shown.
#[derive(Debug, Clone, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Headline text.  Always present, possibly empty: a `null` or missing
    /// title on the wire decodes as `""`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,

    /// Short summary shown under the headline.
    #[serde(default)]
    pub description: Option<String>,

    /// Truncated article body, as provided by the upstream.
    #[serde(default)]
    pub content: Option<String>,

    /// Lead image for the detail view.
    #[serde(default, rename = "urlToImage")]
    pub image_url: Option<String>,

    /// Free-form publication timestamp, not guaranteed to be well-formed.
    /// A non-string value on the wire is kept as its JSON text.
    #[serde(default, deserialize_with = "lenient_text")]
    pub published_at: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    /// Link to the full story.
    #[serde(default)]
    pub url: Option<String>,

    /// Display name of the outlet (the wire's `source.name`).
    #[serde(default, rename = "source", deserialize_with = "source_name")]
    pub source_name: Option<String>,
}

impl Article {
    /// Shorthand constructor used by tests and scripted sources.
    pub fn new(title: impl Into<String>, published_at: Option<&str>) -> Self {
        Self {
            title: title.into(),
            published_at: published_at.map(String::from),
            ..Self::default()
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

fn source_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct WireSource {
        #[serde(default)]
        name: Option<String>,
    }

    Ok(Option::<WireSource>::deserialize(deserializer)?.and_then(|s| s.name))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
