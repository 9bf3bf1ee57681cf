#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Blocking HTTP client with a total, non-throwing request surface
//!
//! This crate provides a hyper-based HTTP executor with:
//! - A uniform result type: every failure comes back as a response value,
//!   never a panic and never an `Err`
//! - Automatic TLS via rustls (webpki roots, HTTP and HTTPS targets)
//! - Connection pooling, one pool per DNS strategy
//! - System DNS with a public-DNS fallback, switchable per request
//! - Per-request timeouts read from live configuration, with active
//!   cancellation of the transfer when the wait elapses
//! - Transparent redirect following with body replay
//! - Default `User-Agent` injection (plus `Content-Length` when defaulted)
//! - Value-less form-field encoding for endpoints that use bare-key flags
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use backhaul_http::{FigmentProperties, HttpClient};
//!
//! let properties = Arc::new(FigmentProperties::from_default_sources());
//! let client = HttpClient::new(properties)?;
//!
//! // Failures never raise; inspect the response instead.
//! let response = client.get("https://example.com/api/status");
//! if response.is_success() {
//!     println!("{}", response.text());
//! } else {
//!     eprintln!("request failed: {}", response.text());
//! }
//! ```

mod client;
mod config;
mod dns;
mod error;
mod form;
mod headers;
mod redirect;
mod request;
mod response;
mod tls;

pub use client::HttpClient;
pub use config::{
    DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, FigmentProperties, HTTP_CLIENT_TIMEOUT, MemoryProperties,
    PropertySource, USE_DEFAULT_DNS_RESOLVER,
};
pub use dns::ResolverStrategy;
pub use error::{HttpError, InvalidUriKind};
pub use form::{query_string, urlencode};
pub use headers::{default_headers, default_headers_for, empty_headers, is_mutator_with_body};
pub use redirect::MAX_REDIRECTS;
pub use response::{ClientResponse, RequestEcho};
