//! Blocking HTTP execution surface.
//!
//! [`HttpClient`] owns a small I/O runtime and two prebuilt transport stacks,
//! one per DNS strategy. Each call bridges the async round trip behind a
//! synchronous method that always comes back with a [`ClientResponse`],
//! never a panic and never an `Err`.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::response::Parts;
use http::{HeaderMap, Method, Request, Response};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::dns::GaiResolver;
use hyper_util::client::legacy::connect::{Connect, HttpConnector};
use hyper_util::rt::{TokioExecutor, TokioTimer};
use tokio::runtime::Runtime;
use tower::{Layer, Service, ServiceExt};
use tower_http::follow_redirect::{FollowRedirect, FollowRedirectLayer};

use crate::config::{self, PropertySource};
use crate::dns::{CompositeResolver, ResolverStrategy};
use crate::error::HttpError;
use crate::form;
use crate::headers;
use crate::redirect::FollowAll;
use crate::request;
use crate::response::{ClientResponse, RequestEcho};
use crate::tls;

/// Idle connections kept pooled per host, per stack.
const POOL_MAX_IDLE_PER_HOST: usize = 32;

/// Idle pooled connections are torn down after this long.
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// One transport stack: a redirect-following client over resolver `R`.
type Transport<R> =
    FollowRedirect<Client<HttpsConnector<HttpConnector<R>>, Full<Bytes>>, FollowAll>;

type LegacyError = hyper_util::client::legacy::Error;

/// Blocking HTTP client with a total, non-throwing request surface.
///
/// Every dispatch method returns a [`ClientResponse`]. Failures of any kind,
/// from an unparseable URL to an elapsed timeout, come back as the failure
/// form of that response instead of an error or a panic, so call sites need
/// no local error handling.
///
/// The client owns its runtime and two prebuilt transport stacks, one per
/// [`ResolverStrategy`](crate::dns::ResolverStrategy). Which stack serves a
/// request, and how long the caller waits for it, are read from the
/// [`PropertySource`] on every call; configuration changes apply to the next
/// request without rebuilding the client.
///
/// Cloning is cheap, and clones share the runtime and connection pools.
/// Calls block the current thread and must not be issued from inside an
/// async runtime.
///
/// # Example
///
/// ```rust,ignore
/// use backhaul_http::HttpClient;
///
/// let client = HttpClient::with_defaults()?;
/// let response = client.get("https://api.example.org/status");
/// if response.is_success() {
///     println!("{}", response.text());
/// } else {
///     eprintln!("request failed: {}", response.text());
/// }
/// ```
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    runtime: Runtime,
    system: Transport<GaiResolver>,
    composite: Transport<CompositeResolver>,
    properties: Arc<dyn PropertySource>,
}

impl HttpClient {
    /// Builds a client that reads per-request settings from `properties`.
    ///
    /// # Errors
    ///
    /// Fails when the I/O runtime cannot start ([`HttpError::Runtime`]) or
    /// the TLS backend cannot be assembled ([`HttpError::Tls`]). Both are
    /// construction-time faults; once a client exists, its request methods
    /// never return errors.
    pub fn new(properties: Arc<dyn PropertySource>) -> Result<Self, HttpError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("backhaul-http")
            .enable_all()
            .build()
            .map_err(HttpError::Runtime)?;

        let system = build_transport(tls::https_connector(GaiResolver::new())?);
        let composite = build_transport(tls::https_connector(CompositeResolver::new())?);

        Ok(Self {
            inner: Arc::new(ClientInner {
                runtime,
                system,
                composite,
                properties,
            }),
        })
    }

    /// Builds a client with an empty property store, so every request uses
    /// the compiled-in defaults.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`HttpClient::new`].
    pub fn with_defaults() -> Result<Self, HttpError> {
        Self::new(Arc::new(config::MemoryProperties::new()))
    }

    /// Executes one HTTP exchange and blocks until it resolves.
    ///
    /// Headers are merged with the defaults first: a missing `User-Agent` is
    /// filled in, and in that case only, a missing `Content-Length` is set
    /// to the UTF-8 byte length of `body` (zero when there is none).
    /// Redirects are followed transparently, up to
    /// [`MAX_REDIRECTS`](crate::MAX_REDIRECTS) hops.
    ///
    /// The wait is bounded by the configured timeout, and an elapsed wait
    /// aborts the in-flight transfer. Whatever happens, the return value is
    /// a [`ClientResponse`]: completed exchanges carry status, headers, and
    /// body, and failures carry the error plus its classification label as
    /// the substitute body.
    pub fn request(
        &self,
        method: Method,
        url: &str,
        headers: &HeaderMap,
        body: Option<&str>,
    ) -> ClientResponse {
        let merged = request::merge_headers(headers, body);
        let echo = RequestEcho::new(
            method,
            url.to_owned(),
            merged.clone(),
            body.map(ToOwned::to_owned),
        );

        let uri = match request::validate_url(url) {
            Ok(uri) => uri,
            Err(error) => {
                tracing::warn!(url, %error, "rejected request URL");
                return ClientResponse::failed(error, echo);
            }
        };

        let outbound = match request::build_request(echo.method(), &uri, &merged, body) {
            Ok(outbound) => outbound,
            Err(error) => {
                tracing::warn!(url, %error, "could not assemble request");
                return ClientResponse::failed(error, echo);
            }
        };

        let strategy = ResolverStrategy::select(self.inner.properties.as_ref());
        let limit = config::request_timeout(self.inner.properties.as_ref());
        tracing::debug!(
            method = %echo.method(),
            url,
            ?strategy,
            timeout = ?limit,
            "dispatching request"
        );

        match self.dispatch(strategy, outbound, limit) {
            Ok((parts, payload)) => {
                tracing::debug!(
                    method = %echo.method(),
                    url,
                    status = %parts.status,
                    bytes = payload.len(),
                    "request completed"
                );
                ClientResponse::completed(parts.status, parts.headers, payload, echo)
            }
            Err(error) => {
                tracing::warn!(method = %echo.method(), url, %error, "request failed");
                ClientResponse::failed(error, echo)
            }
        }
    }

    /// HEAD with no preset headers.
    pub fn head(&self, url: &str) -> ClientResponse {
        self.request(Method::HEAD, url, &headers::empty_headers(), None)
    }

    /// HEAD with caller-supplied headers.
    pub fn head_with_headers(&self, url: &str, headers: &HeaderMap) -> ClientResponse {
        self.request(Method::HEAD, url, headers, None)
    }

    /// GET with no preset headers.
    pub fn get(&self, url: &str) -> ClientResponse {
        self.request(Method::GET, url, &headers::empty_headers(), None)
    }

    /// GET with caller-supplied headers.
    pub fn get_with_headers(&self, url: &str, headers: &HeaderMap) -> ClientResponse {
        self.request(Method::GET, url, headers, None)
    }

    /// POST a raw body with the form-submission default headers.
    pub fn post(&self, url: &str, body: &str) -> ClientResponse {
        self.request(
            Method::POST,
            url,
            &headers::default_headers_for(&Method::POST, false),
            Some(body),
        )
    }

    /// POST a raw body with caller-supplied headers.
    pub fn post_with_headers(&self, url: &str, headers: &HeaderMap, body: &str) -> ClientResponse {
        self.request(Method::POST, url, headers, Some(body))
    }

    /// POST form fields, URL-encoded in iteration order.
    ///
    /// A `None` value sends the bare key with no `=`.
    pub fn post_form(&self, url: &str, fields: &[(&str, Option<&str>)]) -> ClientResponse {
        self.post(url, &encode_fields(fields))
    }

    /// POST form fields with caller-supplied headers.
    pub fn post_form_with_headers(
        &self,
        url: &str,
        headers: &HeaderMap,
        fields: &[(&str, Option<&str>)],
    ) -> ClientResponse {
        self.post_with_headers(url, headers, &encode_fields(fields))
    }

    /// POST a JSON payload; `Content-Type` and `Accept` are set to JSON.
    pub fn post_json(&self, url: &str, payload: &serde_json::Value) -> ClientResponse {
        self.request(
            Method::POST,
            url,
            &headers::default_headers_for(&Method::POST, true),
            Some(&payload.to_string()),
        )
    }

    /// POST a JSON payload with caller-supplied headers.
    pub fn post_json_with_headers(
        &self,
        url: &str,
        headers: &HeaderMap,
        payload: &serde_json::Value,
    ) -> ClientResponse {
        self.request(Method::POST, url, headers, Some(&payload.to_string()))
    }

    /// PUT a raw body with the form-submission default headers.
    pub fn put(&self, url: &str, body: &str) -> ClientResponse {
        self.request(
            Method::PUT,
            url,
            &headers::default_headers_for(&Method::PUT, false),
            Some(body),
        )
    }

    /// PUT a raw body with caller-supplied headers.
    pub fn put_with_headers(&self, url: &str, headers: &HeaderMap, body: &str) -> ClientResponse {
        self.request(Method::PUT, url, headers, Some(body))
    }

    /// PUT form fields, URL-encoded in iteration order.
    pub fn put_form(&self, url: &str, fields: &[(&str, Option<&str>)]) -> ClientResponse {
        self.put(url, &encode_fields(fields))
    }

    /// PUT form fields with caller-supplied headers.
    pub fn put_form_with_headers(
        &self,
        url: &str,
        headers: &HeaderMap,
        fields: &[(&str, Option<&str>)],
    ) -> ClientResponse {
        self.put_with_headers(url, headers, &encode_fields(fields))
    }

    /// PUT a JSON payload; `Content-Type` and `Accept` are set to JSON.
    pub fn put_json(&self, url: &str, payload: &serde_json::Value) -> ClientResponse {
        self.request(
            Method::PUT,
            url,
            &headers::default_headers_for(&Method::PUT, true),
            Some(&payload.to_string()),
        )
    }

    /// PUT a JSON payload with caller-supplied headers.
    pub fn put_json_with_headers(
        &self,
        url: &str,
        headers: &HeaderMap,
        payload: &serde_json::Value,
    ) -> ClientResponse {
        self.request(Method::PUT, url, headers, Some(&payload.to_string()))
    }

    /// PATCH a raw body with the form-submission default headers.
    pub fn patch(&self, url: &str, body: &str) -> ClientResponse {
        self.request(
            Method::PATCH,
            url,
            &headers::default_headers_for(&Method::PATCH, false),
            Some(body),
        )
    }

    /// PATCH a raw body with caller-supplied headers.
    pub fn patch_with_headers(&self, url: &str, headers: &HeaderMap, body: &str) -> ClientResponse {
        self.request(Method::PATCH, url, headers, Some(body))
    }

    /// PATCH form fields, URL-encoded in iteration order.
    pub fn patch_form(&self, url: &str, fields: &[(&str, Option<&str>)]) -> ClientResponse {
        self.patch(url, &encode_fields(fields))
    }

    /// PATCH form fields with caller-supplied headers.
    pub fn patch_form_with_headers(
        &self,
        url: &str,
        headers: &HeaderMap,
        fields: &[(&str, Option<&str>)],
    ) -> ClientResponse {
        self.patch_with_headers(url, headers, &encode_fields(fields))
    }

    /// PATCH a JSON payload; `Content-Type` and `Accept` are set to JSON.
    pub fn patch_json(&self, url: &str, payload: &serde_json::Value) -> ClientResponse {
        self.request(
            Method::PATCH,
            url,
            &headers::default_headers_for(&Method::PATCH, true),
            Some(&payload.to_string()),
        )
    }

    /// PATCH a JSON payload with caller-supplied headers.
    pub fn patch_json_with_headers(
        &self,
        url: &str,
        headers: &HeaderMap,
        payload: &serde_json::Value,
    ) -> ClientResponse {
        self.request(Method::PATCH, url, headers, Some(&payload.to_string()))
    }

    /// DELETE with no preset headers.
    pub fn delete(&self, url: &str) -> ClientResponse {
        self.request(Method::DELETE, url, &headers::empty_headers(), None)
    }

    /// DELETE with caller-supplied headers.
    pub fn delete_with_headers(&self, url: &str, headers: &HeaderMap) -> ClientResponse {
        self.request(Method::DELETE, url, headers, None)
    }

    /// Runs the round trip on the owned runtime and waits for it, bounded by
    /// `limit`.
    fn dispatch(
        &self,
        strategy: ResolverStrategy,
        outbound: Request<Full<Bytes>>,
        limit: Duration,
    ) -> Result<(Parts, Bytes), HttpError> {
        let task = match strategy {
            ResolverStrategy::System => self
                .inner
                .runtime
                .spawn(roundtrip(self.inner.system.clone(), outbound)),
            ResolverStrategy::Composite => self
                .inner
                .runtime
                .spawn(roundtrip(self.inner.composite.clone(), outbound)),
        };

        // Keep a handle so an elapsed wait tears the transfer down instead
        // of leaving it running unobserved.
        let abort = task.abort_handle();
        // The timeout timer must be created inside the runtime context, so
        // the wrapping async block defers it until `block_on` has entered.
        let bounded = async move { tokio::time::timeout(limit, task).await };
        match self.inner.runtime.block_on(bounded) {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(interrupted)) => Err(HttpError::Interrupted(interrupted)),
            Err(_) => {
                abort.abort();
                Err(HttpError::Timeout(limit))
            }
        }
    }
}

fn build_transport<R>(connector: HttpsConnector<HttpConnector<R>>) -> Transport<R>
where
    HttpsConnector<HttpConnector<R>>: Connect + Clone,
{
    let mut builder = Client::builder(TokioExecutor::new());
    // pool_timer is required for pool_idle_timeout to take effect.
    builder
        .pool_timer(TokioTimer::new())
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .http2_only(false);
    let client = builder.build::<_, Full<Bytes>>(connector);
    FollowRedirectLayer::with_policy(FollowAll::new()).layer(client)
}

fn encode_fields(fields: &[(&str, Option<&str>)]) -> String {
    form::urlencode(fields.iter().map(|&(key, value)| (Some(key), value)))
}

async fn roundtrip<S>(
    mut stack: S,
    outbound: Request<Full<Bytes>>,
) -> Result<(Parts, Bytes), HttpError>
where
    S: Service<Request<Full<Bytes>>, Response = Response<Incoming>, Error = LegacyError>,
{
    let response = stack.ready().await?.call(outbound).await?;
    let (parts, body) = response.into_parts();
    let collected = body.collect().await?;
    Ok((parts, collected.to_bytes()))
}
