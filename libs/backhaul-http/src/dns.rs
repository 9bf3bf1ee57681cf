//! DNS resolution strategies.
//!
//! Two strategies cover the deployment spread:
//! - **System**: operating-system resolution (`getaddrinfo` on the runtime's
//!   blocking pool), for hosts whose local resolver configuration is trusted.
//! - **Composite**: system resolution first, with a public-DNS fallback
//!   (Cloudflare, then Google upstreams) when the system resolver errors or
//!   comes back empty. This is the default; it papers over broken local DNS,
//!   which is common on the small boxes this client tends to run on.
//!
//! Both strategies are stateless values built once per client and shared
//! across requests; the per-request choice is read from configuration each
//! call.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hyper_util::client::legacy::connect::dns::{GaiResolver, Name};
use tower::Service;

use crate::config::{PropertySource, USE_DEFAULT_DNS_RESOLVER};

/// DNS strategy a request dispatches over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverStrategy {
    /// Operating-system resolution only.
    System,
    /// System resolution with public-DNS fallback.
    Composite,
}

impl ResolverStrategy {
    /// Strategy for the next request, honoring the
    /// [`USE_DEFAULT_DNS_RESOLVER`] property (unset means composite).
    #[must_use]
    pub fn select(properties: &dyn PropertySource) -> Self {
        if properties.bool_or(USE_DEFAULT_DNS_RESOLVER, false) {
            ResolverStrategy::System
        } else {
            ResolverStrategy::Composite
        }
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Resolver service implementing the composite strategy.
///
/// Satisfies the connector's resolver interface (`Service<Name>` yielding an
/// address iterator), so it plugs into `HttpConnector::new_with_resolver`.
#[derive(Clone)]
pub struct CompositeResolver {
    system: GaiResolver,
    fallback: TokioAsyncResolver,
}

impl CompositeResolver {
    pub fn new() -> Self {
        // Cloudflare upstreams first, Google second; first answer wins.
        let mut config = ResolverConfig::new();
        for ns in ResolverConfig::cloudflare().name_servers() {
            config.add_name_server(ns.clone());
        }
        for ns in ResolverConfig::google().name_servers() {
            config.add_name_server(ns.clone());
        }
        Self {
            system: GaiResolver::new(),
            fallback: TokioAsyncResolver::tokio(config, ResolverOpts::default()),
        }
    }
}

impl Default for CompositeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Name> for CompositeResolver {
    type Response = std::vec::IntoIter<SocketAddr>;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.system.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, name: Name) -> Self::Future {
        let mut system = self.system.clone();
        let fallback = self.fallback.clone();
        Box::pin(async move {
            match system.call(name.clone()).await {
                Ok(addrs) => {
                    let addrs: Vec<SocketAddr> = addrs.collect();
                    if !addrs.is_empty() {
                        return Ok(addrs.into_iter());
                    }
                    tracing::debug!(
                        host = name.as_str(),
                        "system resolver returned no addresses, falling back to public DNS"
                    );
                }
                Err(err) => {
                    tracing::debug!(
                        host = name.as_str(),
                        error = %err,
                        "system resolver failed, falling back to public DNS"
                    );
                }
            }
            // The connector rewrites ports after resolution, so 0 is fine here.
            let lookup = fallback.lookup_ip(name.as_str()).await?;
            let addrs: Vec<SocketAddr> = lookup.iter().map(|ip| SocketAddr::new(ip, 0)).collect();
            Ok(addrs.into_iter())
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::MemoryProperties;
    use tower::ServiceExt;

    #[test]
    fn composite_is_the_default_strategy() {
        let props = MemoryProperties::new();
        assert_eq!(
            ResolverStrategy::select(&props),
            ResolverStrategy::Composite
        );
    }

    #[test]
    fn flag_switches_to_system_strategy() {
        let props = MemoryProperties::new().with(USE_DEFAULT_DNS_RESOLVER, "true");
        assert_eq!(ResolverStrategy::select(&props), ResolverStrategy::System);

        let props = MemoryProperties::new().with(USE_DEFAULT_DNS_RESOLVER, "false");
        assert_eq!(
            ResolverStrategy::select(&props),
            ResolverStrategy::Composite
        );
    }

    #[test]
    fn selection_is_stable_across_reads() {
        let props = MemoryProperties::new().with(USE_DEFAULT_DNS_RESOLVER, "1");
        let first = ResolverStrategy::select(&props);
        let second = ResolverStrategy::select(&props);
        assert_eq!(first, second);
    }

    #[test]
    fn composite_resolves_loopback_without_fallback() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut resolver = CompositeResolver::new();
        let name: Name = "localhost".parse().unwrap();

        let addrs: Vec<SocketAddr> = rt.block_on(async {
            let svc = resolver.ready().await.unwrap();
            svc.call(name).await.unwrap().collect()
        });

        assert!(!addrs.is_empty());
        assert!(addrs.iter().all(|addr| addr.ip().is_loopback()));
    }
}
