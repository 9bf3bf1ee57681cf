//! TLS and connector assembly for the transport stacks.
//!
//! One connector per resolver strategy, both speaking `https_or_http`: the
//! URL scheme alone decides whether a connection negotiates TLS (webpki
//! roots) or goes out in plain text.

use std::sync::Arc;

use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;

use crate::error::HttpError;

/// Crypto provider for TLS connections.
///
/// Respects a globally installed default provider when one exists; otherwise
/// falls back to aws-lc-rs without mutating global state.
fn crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

/// Builds the scheme-dispatching connector over `resolver`-driven TCP
/// establishment.
///
/// # Errors
/// Returns `HttpError::Tls` if the TLS protocol versions cannot be
/// configured for the selected crypto provider.
pub fn https_connector<R>(resolver: R) -> Result<HttpsConnector<HttpConnector<R>>, HttpError> {
    let mut http = HttpConnector::new_with_resolver(resolver);
    // The inner connector must hand https URIs through to the TLS wrapper.
    http.enforce_http(false);

    let builder = hyper_rustls::HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(crypto_provider())
        .map_err(|e| HttpError::Tls(Box::new(e)))?;

    Ok(builder
        .https_or_http()
        .enable_all_versions()
        .wrap_connector(http))
}
