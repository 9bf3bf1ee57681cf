//! Default header construction driven by HTTP method semantics.

use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};

/// True exactly for the methods that submit a request body (POST/PUT/PATCH).
///
/// HEAD/GET/DELETE never imply one here, regardless of what a caller attaches.
#[must_use]
pub fn is_mutator_with_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

/// Default header set for a request.
///
/// `wants_json` drives content negotiation (`Accept: application/json`);
/// `mutator_with_body` adds the matching `Content-Type` for body-carrying
/// methods (JSON when `wants_json`, form-urlencoded otherwise). Callers layer
/// their own headers on top of the returned map; the executor never clobbers
/// an explicitly supplied value.
#[must_use]
pub fn default_headers(mutator_with_body: bool, wants_json: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if wants_json {
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    }
    if mutator_with_body {
        let content_type = if wants_json {
            "application/json"
        } else {
            "application/x-www-form-urlencoded"
        };
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    headers
}

/// [`default_headers`] with the body-carrying flag derived from `method`.
#[must_use]
pub fn default_headers_for(method: &Method, wants_json: bool) -> HeaderMap {
    default_headers(is_mutator_with_body(method), wants_json)
}

/// Fresh empty header set for callers building theirs from scratch.
#[must_use]
pub fn empty_headers() -> HeaderMap {
    HeaderMap::new()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn mutator_json_sets_accept_and_content_type() {
        let headers = default_headers(true, true);
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn mutator_form_sets_content_type_without_accept() {
        let headers = default_headers(true, false);
        assert!(headers.get(ACCEPT).is_none());
        assert_eq!(
            headers.get(CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );
    }

    #[test]
    fn non_mutator_json_sets_accept_only() {
        let headers = default_headers(false, true);
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
        assert!(headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn plain_defaults_are_empty() {
        assert!(default_headers(false, false).is_empty());
        assert!(empty_headers().is_empty());
    }

    #[test]
    fn body_carrying_methods_are_post_put_patch() {
        assert!(is_mutator_with_body(&Method::POST));
        assert!(is_mutator_with_body(&Method::PUT));
        assert!(is_mutator_with_body(&Method::PATCH));
        assert!(!is_mutator_with_body(&Method::GET));
        assert!(!is_mutator_with_body(&Method::HEAD));
        assert!(!is_mutator_with_body(&Method::DELETE));
    }

    #[test]
    fn method_overload_matches_explicit_flags() {
        assert_eq!(
            default_headers_for(&Method::PUT, true),
            default_headers(true, true)
        );
        assert_eq!(
            default_headers_for(&Method::DELETE, false),
            default_headers(false, false)
        );
    }
}
