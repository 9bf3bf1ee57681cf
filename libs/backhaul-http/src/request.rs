//! Per-call request assembly: URL validation, header merge, body
//! materialization.

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, USER_AGENT};
use http::{HeaderMap, HeaderValue, Method, Request, Uri};
use http_body_util::Full;

use crate::config::DEFAULT_USER_AGENT;
use crate::error::{HttpError, InvalidUriKind};

/// Parses and validates a target URL: absolute, scheme `http` or `https`,
/// authority present.
pub fn validate_url(url: &str) -> Result<Uri, HttpError> {
    let uri: Uri = url.parse().map_err(|e: http::uri::InvalidUri| {
        HttpError::InvalidUri {
            url: url.to_owned(),
            kind: InvalidUriKind::ParseError,
            reason: e.to_string(),
        }
    })?;

    match uri.scheme_str() {
        Some("http" | "https") => {}
        Some(other) => {
            return Err(HttpError::InvalidUri {
                url: url.to_owned(),
                kind: InvalidUriKind::UnsupportedScheme,
                reason: format!("scheme '{other}' is not supported, use http or https"),
            });
        }
        None => {
            return Err(HttpError::InvalidUri {
                url: url.to_owned(),
                kind: InvalidUriKind::MissingScheme,
                reason: "URL must be absolute (http:// or https://)".to_owned(),
            });
        }
    }

    if uri.authority().is_none() {
        return Err(HttpError::InvalidUri {
            url: url.to_owned(),
            kind: InvalidUriKind::MissingAuthority,
            reason: "URL must include a host".to_owned(),
        });
    }

    Ok(uri)
}

/// Merges caller headers with the default-identity rule.
///
/// The caller's headers are taken verbatim. When no User-Agent is present,
/// [`DEFAULT_USER_AGENT`] is injected, and only inside that branch a missing
/// Content-Length is set to the body's UTF-8 byte length (zero when there is
/// no body). A caller-supplied User-Agent therefore also suppresses the
/// Content-Length computation; the transport still frames whatever body it
/// actually sends, so the wire stays correct either way.
#[must_use]
pub fn merge_headers(caller: &HeaderMap, body: Option<&str>) -> HeaderMap {
    let mut headers = caller.clone();
    if !headers.contains_key(USER_AGENT) {
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        if !headers.contains_key(CONTENT_LENGTH) {
            let length = body.map_or(0, str::len);
            headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
        }
    }
    headers
}

/// Builds the transport request.
///
/// An absent body sends a zero-length payload; a present body sends its
/// literal UTF-8 bytes. `headers` replaces the builder's header map
/// wholesale, multi-values included.
pub fn build_request(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Option<&str>,
) -> Result<Request<Full<Bytes>>, HttpError> {
    let payload = body.map_or_else(Bytes::new, |b| Bytes::copy_from_slice(b.as_bytes()));
    let mut request = Request::builder()
        .method(method.clone())
        .uri(uri.clone())
        .body(Full::new(payload))?;
    *request.headers_mut() = headers.clone();
    Ok(request)
}
