//! Error types for the fetch pipeline and the biometric gate.
//!
//! Neither kind ever reaches the user as a crash: fetch errors are logged and
//! dropped by the coordinator, and the only gate error is a rejected
//! re-invocation.  The binary itself uses [`anyhow`] at its boundary.

use thiserror::Error;

/// Why a headline fetch produced no articles.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, TLS, connection reset, ...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The upstream answered 2xx but flagged the request as failed in the body.
    #[error("upstream error {code}: {message}")]
    Api { code: String, message: String },

    /// The body was not the expected JSON shape.
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The body decoded but carried no `articles` collection at all.
    #[error("response carried no articles collection")]
    MissingArticles,
}

/// Why the gate refused to start a prompt.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum GateError {
    /// A prompt session from an earlier invocation has not ended yet.
    #[error("an authentication prompt is already in progress")]
    PromptInProgress,
}
