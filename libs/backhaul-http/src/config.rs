//! Injected configuration capability consulted by the request executor.
//!
//! The client never caches property values: both keys below are read on every
//! request, so changes in the backing store take effect on the next call.
//!
//! Two implementations are provided: [`MemoryProperties`] for embedders (and
//! tests) that already hold their configuration, and [`FigmentProperties`] for
//! file/environment wiring.

use std::collections::HashMap;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};

/// Identifier sent when the caller does not supply a User-Agent.
pub const DEFAULT_USER_AGENT: &str = concat!("backhaul-http/", env!("CARGO_PKG_VERSION"));

/// Property key selecting the DNS resolver strategy (boolean, default `false`).
///
/// `true` routes requests through the system resolver alone; `false` uses the
/// composite strategy with a public-DNS fallback.
pub const USE_DEFAULT_DNS_RESOLVER: &str = "usedefaultdnsresolver";

/// Property key bounding the blocking wait, in whole seconds (default `10`).
pub const HTTP_CLIENT_TIMEOUT: &str = "httpclienttimeout";

/// Blocking-wait bound applied when [`HTTP_CLIENT_TIMEOUT`] is unset.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Process-wide key/value configuration, queried by key name.
///
/// Implementations must be cheap to query; the executor performs lookups on
/// the calling thread before dispatching to the transport.
pub trait PropertySource: Send + Sync {
    /// Returns the raw string value for `key`, if present.
    fn get(&self, key: &str) -> Option<String>;

    /// Returns the boolean value for `key`, if present and coercible.
    ///
    /// The default implementation coerces from the string form the way a
    /// lenient properties file does: `true`/`1`/`yes`/`on` and their
    /// uppercase variants are true, `false`/`0`/`no`/`off` are false.
    fn get_bool(&self, key: &str) -> Option<bool> {
        coerce_bool(&self.get(key)?)
    }

    /// Returns the unsigned integer value for `key`, if present and parseable.
    fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key)?.trim().parse().ok()
    }

    /// Boolean lookup with a declared default.
    fn bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    /// Integer lookup with a declared default.
    fn u64_or(&self, key: &str, default: u64) -> u64 {
        self.get_u64(key).unwrap_or(default)
    }
}

/// Blocking-wait bound for the next request, honoring [`HTTP_CLIENT_TIMEOUT`].
#[must_use]
pub fn request_timeout(properties: &dyn PropertySource) -> Duration {
    Duration::from_secs(properties.u64_or(HTTP_CLIENT_TIMEOUT, DEFAULT_TIMEOUT.as_secs()))
}

fn coerce_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// In-memory property store with case-insensitive keys.
///
/// Key comparison is case-insensitive, matching the caseless properties file
/// this interface descends from.
#[derive(Debug, Clone, Default)]
pub struct MemoryProperties {
    values: HashMap<String, String>,
}

impl MemoryProperties {
    /// Empty store; every lookup falls back to the declared defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a property, consuming and returning the store.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Inserts or replaces a property.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_ascii_lowercase(), value.into());
    }
}

impl PropertySource for MemoryProperties {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(&key.to_ascii_lowercase()).cloned()
    }
}

/// Property source backed by a [`Figment`] (typed file + environment config).
#[derive(Debug, Clone)]
pub struct FigmentProperties {
    figment: Figment,
}

impl FigmentProperties {
    /// Wraps a pre-assembled figment. Later merges win, per figment rules.
    #[must_use]
    pub fn new(figment: Figment) -> Self {
        Self { figment }
    }

    /// Conventional wiring: optional `backhaul.yml` in the working directory,
    /// overridden by `BACKHAUL_*` environment variables.
    #[must_use]
    pub fn from_default_sources() -> Self {
        Self::new(
            Figment::new()
                .merge(Yaml::file("backhaul.yml"))
                .merge(Env::prefixed("BACKHAUL_")),
        )
    }
}

impl PropertySource for FigmentProperties {
    fn get(&self, key: &str) -> Option<String> {
        self.figment.extract_inner::<String>(key).ok()
    }

    // Typed lookups go straight to the figment so native YAML booleans and
    // integers survive without a string round trip.
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.figment.extract_inner::<bool>(key).ok()
    }

    fn get_u64(&self, key: &str) -> Option<u64> {
        self.figment.extract_inner::<u64>(key).ok()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn memory_keys_are_case_insensitive() {
        let props = MemoryProperties::new().with("HttpClientTimeout", "25");
        assert_eq!(props.get_u64(HTTP_CLIENT_TIMEOUT), Some(25));
        assert_eq!(props.get_u64("HTTPCLIENTTIMEOUT"), Some(25));
    }

    #[test]
    fn bool_coercion_is_lenient() {
        let props = MemoryProperties::new()
            .with("a", "true")
            .with("b", "1")
            .with("c", "Yes")
            .with("d", "off")
            .with("e", "maybe");
        assert_eq!(props.get_bool("a"), Some(true));
        assert_eq!(props.get_bool("b"), Some(true));
        assert_eq!(props.get_bool("c"), Some(true));
        assert_eq!(props.get_bool("d"), Some(false));
        assert_eq!(props.get_bool("e"), None);
    }

    #[test]
    fn declared_defaults_apply_when_unset() {
        let props = MemoryProperties::new();
        assert!(!props.bool_or(USE_DEFAULT_DNS_RESOLVER, false));
        assert_eq!(request_timeout(&props), DEFAULT_TIMEOUT);
    }

    #[test]
    fn configured_timeout_overrides_default() {
        let props = MemoryProperties::new().with(HTTP_CLIENT_TIMEOUT, "3");
        assert_eq!(request_timeout(&props), Duration::from_secs(3));
    }

    #[test]
    fn unparseable_timeout_falls_back_to_default() {
        let props = MemoryProperties::new().with(HTTP_CLIENT_TIMEOUT, "soon");
        assert_eq!(request_timeout(&props), DEFAULT_TIMEOUT);
    }

    #[test]
    fn figment_source_preserves_native_types() {
        use figment::providers::Serialized;

        let source = FigmentProperties::new(Figment::new().merge(Serialized::defaults(
            serde_json::json!({
                HTTP_CLIENT_TIMEOUT: 30,
                USE_DEFAULT_DNS_RESOLVER: true
            }),
        )));
        assert_eq!(source.get_u64(HTTP_CLIENT_TIMEOUT), Some(30));
        assert_eq!(source.get_bool(USE_DEFAULT_DNS_RESOLVER), Some(true));
        assert_eq!(source.get_u64("missing"), None);
    }
}
