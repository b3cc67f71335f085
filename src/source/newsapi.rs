//! newsapi.org headline source.
//!
//! Fetches `GET {base_url}top-headlines?sources={key}&apiKey={api_key}` with
//! an injected [`reqwest::Client`] and decodes the JSON body into
//! [`Article`]s.
//!
//! Decoding is split out into [`NewsApiSource::decode_response`], a pure
//! function over status code and body bytes, so tests can exercise every
//! failure mode without touching the network.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{Article, HeadlineSource, SourceKey};
use crate::error::FetchError;

/// Connection settings for [`NewsApiSource`].
#[derive(Debug, Clone)]
pub struct NewsApiConfig {
    /// API root, e.g. `https://newsapi.org/v2/`.
    pub base_url: String,
    pub api_key: String,
    /// Whole-request timeout applied by the HTTP client.
    pub timeout: Duration,
}

impl NewsApiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://newsapi.org/v2/";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Full URL of the `top-headlines` endpoint, tolerant of a missing
    /// trailing slash on `base_url`.
    fn endpoint(&self) -> String {
        format!("{}/top-headlines", self.base_url.trim_end_matches('/'))
    }
}

/// A [`HeadlineSource`] backed by the newsapi.org REST API.
pub struct NewsApiSource {
    client: reqwest::Client,
    config: NewsApiConfig,
}

/// Success envelope: `{ "status": "ok", "totalResults": n, "articles": [...] }`.
/// Error bodies reuse `status` and add `code` / `message`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    total_results: Option<u64>,
    #[serde(default)]
    articles: Option<Vec<Article>>,
}

impl NewsApiSource {
    /// Build a source around a caller-owned client.
    pub fn new(client: reqwest::Client, config: NewsApiConfig) -> Self {
        Self { client, config }
    }

    /// Build a source with its own client carrying `config.timeout`.
    pub fn from_config(config: NewsApiConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::new(client, config))
    }

    /// Turn a raw HTTP answer into articles.
    ///
    /// Non-2xx statuses, `"status": "error"` bodies, malformed JSON and a
    /// missing or `null` `articles` field are all errors.  An empty
    /// `articles` array is a valid, empty result.
    pub fn decode_response(status: u16, body: &[u8]) -> Result<Vec<Article>, FetchError> {
        if !(200..300).contains(&status) {
            // newsapi error bodies carry a readable message; fall back to the
            // raw text when the body is not JSON.
            let message = serde_json::from_slice::<Envelope>(body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());
            return Err(FetchError::Status { status, message });
        }

        let envelope: Envelope = serde_json::from_slice(body)?;

        if envelope.status.as_deref() == Some("error") {
            return Err(FetchError::Api {
                code: envelope.code.unwrap_or_else(|| "unknown".into()),
                message: envelope.message.unwrap_or_default(),
            });
        }

        let articles = envelope.articles.ok_or(FetchError::MissingArticles)?;
        debug!(
            received = articles.len(),
            total = envelope.total_results,
            "decoded top-headlines response"
        );
        Ok(articles)
    }
}

#[async_trait]
impl HeadlineSource for NewsApiSource {
    async fn top_headlines(&self, key: &SourceKey) -> Result<Vec<Article>, FetchError> {
        debug!(source = %key, "requesting top headlines");

        let response = self
            .client
            .get(self.config.endpoint())
            .query(&[("sources", key.as_str()), ("apiKey", self.config.api_key.as_str())])
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Self::decode_response(status, &body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
