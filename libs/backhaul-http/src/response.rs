//! The uniform response value returned by every request.
//!
//! Success and failure share one shape: callers read status, headers, and
//! body through the same accessors and branch on [`ClientResponse::is_error`]
//! alone, never on a caught fault. A failed response substitutes the error's
//! classification label for the body so logs stay meaningful.

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::HttpError;

/// Request metadata echoed back on every response for diagnostics.
#[derive(Debug, Clone)]
pub struct RequestEcho {
    method: Method,
    url: String,
    headers: HeaderMap,
    body: Option<String>,
}

impl RequestEcho {
    pub(crate) fn new(
        method: Method,
        url: String,
        headers: HeaderMap,
        body: Option<String>,
    ) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }

    /// Method of the originating request.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Originating URL, exactly as the caller supplied it.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Headers as merged for dispatch (after default injection).
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Request body, when one was sent.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

/// Uniform result of a dispatched request.
///
/// `Completed` means the exchange finished, whatever the status code; 4xx and
/// 5xx land here too. `Failed` means the request never produced a response:
/// timeout, interruption, transport fault, or invalid input.
#[derive(Debug)]
#[must_use]
pub enum ClientResponse {
    /// The exchange completed.
    Completed {
        /// Response status code.
        status: StatusCode,
        /// Response headers.
        headers: HeaderMap,
        /// Fully buffered response body (possibly empty, never absent).
        body: Bytes,
        /// Echo of the originating request.
        request: RequestEcho,
    },
    /// The request failed before or during transport.
    Failed {
        /// The captured failure.
        error: HttpError,
        /// Echo of the originating request.
        request: RequestEcho,
    },
}

impl ClientResponse {
    pub(crate) fn completed(
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
        request: RequestEcho,
    ) -> Self {
        ClientResponse::Completed {
            status,
            headers,
            body,
            request,
        }
    }

    pub(crate) fn failed(error: HttpError, request: RequestEcho) -> Self {
        ClientResponse::Failed { error, request }
    }

    /// True when the request failed before or during transport.
    ///
    /// Check this before treating [`status`](Self::status) or
    /// [`body`](Self::body) as meaningful payload.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, ClientResponse::Failed { .. })
    }

    /// True when the exchange completed (any status code).
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.is_error()
    }

    /// Response status code; `None` when the request failed.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientResponse::Completed { status, .. } => Some(*status),
            ClientResponse::Failed { .. } => None,
        }
    }

    /// Response headers; `None` when the request failed.
    #[must_use]
    pub fn headers(&self) -> Option<&HeaderMap> {
        match self {
            ClientResponse::Completed { headers, .. } => Some(headers),
            ClientResponse::Failed { .. } => None,
        }
    }

    /// Response body bytes.
    ///
    /// On failure this is the error's classification label (for example
    /// `Timeout`), standing in for real content. Cloning is cheap; the
    /// buffer is reference-counted.
    #[must_use]
    pub fn body(&self) -> Bytes {
        match self {
            ClientResponse::Completed { body, .. } => body.clone(),
            ClientResponse::Failed { error, .. } => {
                Bytes::from_static(error.classification().as_bytes())
            }
        }
    }

    /// Response body decoded as UTF-8, lossily.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body()).into_owned()
    }

    /// Response body decoded as JSON.
    ///
    /// # Errors
    /// Returns `HttpError::Json` when the body is not valid JSON for `T`;
    /// failed responses decode their classification label, which never is.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        Ok(serde_json::from_slice(&self.body())?)
    }

    /// The captured failure; `None` when the exchange completed.
    #[must_use]
    pub fn error(&self) -> Option<&HttpError> {
        match self {
            ClientResponse::Completed { .. } => None,
            ClientResponse::Failed { error, .. } => Some(error),
        }
    }

    /// Echo of the originating request.
    #[must_use]
    pub fn request(&self) -> &RequestEcho {
        match self {
            ClientResponse::Completed { request, .. } | ClientResponse::Failed { request, .. } => {
                request
            }
        }
    }

    /// Originating URL, exactly as the caller supplied it.
    #[must_use]
    pub fn url(&self) -> &str {
        self.request().url()
    }
}
