use std::time::Duration;
use thiserror::Error;

/// Classification of URL validation failures.
///
/// Provides programmatic matching for different failure modes without
/// relying on unstable error message strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidUriKind {
    /// URL could not be parsed (malformed syntax)
    ParseError,
    /// URL is missing required host/authority component
    MissingAuthority,
    /// URL is missing required scheme (http/https)
    MissingScheme,
    /// URL scheme is neither http nor https
    UnsupportedScheme,
}

/// HTTP client error types.
///
/// Per-request failures are never returned to callers directly; the executor
/// folds them into the failure form of [`crate::ClientResponse`], where
/// [`HttpError::classification`] supplies the substitute body text. Only
/// client construction and the response decode helpers surface these as
/// `Result` errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    /// Request building failed
    #[error("Failed to build request: {0}")]
    RequestBuild(#[from] http::Error),

    /// Invalid header name
    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    /// Invalid header value
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// The bounded wait elapsed before the transport completed
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The in-flight transfer task was torn down while the caller waited
    #[error("Request was interrupted: {0}")]
    Interrupted(#[source] tokio::task::JoinError),

    /// Transport error (connection, resolver, protocol, TLS handshake)
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// TLS configuration error (client construction only)
    #[error("TLS error: {0}")]
    Tls(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// JSON decoding failed (response helper surface only)
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The I/O runtime could not be started (client construction only)
    #[error("Failed to start I/O runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// Invalid URL (failed to parse or validate)
    ///
    /// Use the `kind` field for programmatic matching. The `reason` field
    /// contains a diagnostic message intended for logging only; its format is
    /// unstable.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUri {
        /// The URL that failed validation
        url: String,
        /// Structured failure classification for programmatic matching
        kind: InvalidUriKind,
        /// Diagnostic message (unstable format, for logging only)
        reason: String,
    },
}

impl HttpError {
    /// Stable short label naming the failure class.
    ///
    /// Substituted for the response body when a request fails, so callers
    /// inspecting a failed [`crate::ClientResponse`] see what went wrong
    /// without walking the error chain.
    #[must_use]
    pub fn classification(&self) -> &'static str {
        match self {
            HttpError::RequestBuild(_) => "RequestBuild",
            HttpError::InvalidHeaderName(_) => "InvalidHeaderName",
            HttpError::InvalidHeaderValue(_) => "InvalidHeaderValue",
            HttpError::Timeout(_) => "Timeout",
            HttpError::Interrupted(_) => "Interrupted",
            HttpError::Transport(_) => "Transport",
            HttpError::Tls(_) => "Tls",
            HttpError::Json(_) => "Json",
            HttpError::Runtime(_) => "Runtime",
            HttpError::InvalidUri { .. } => "InvalidUri",
        }
    }
}

impl From<hyper::Error> for HttpError {
    fn from(err: hyper::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}

impl From<hyper_util::client::legacy::Error> for HttpError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}
