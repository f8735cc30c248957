//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Filters applied to every route, in registration order.
    pub global_filters: Vec<FilterRef>,

    /// Route definitions mapping path patterns to upstreams.
    pub routes: Vec<RouteConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8081").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8081".to_string(),
        }
    }
}

/// Route configuration: one entry per upstream binding.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Unique route identifier.
    pub id: String,

    /// Path pattern: a prefix or a trailing `/**` glob.
    pub path: String,

    /// Upstream URI the route forwards to.
    pub upstream: String,

    /// Tie-break among overlapping routes (smaller wins).
    #[serde(default)]
    pub order: i32,

    /// Route-scoped filter references.
    #[serde(default)]
    pub filters: Vec<FilterRef>,
}

/// Reference to a filter, either by bare name or with factory parameters:
///
/// ```toml
/// filters = [
///   "token",
///   { name = "request_time", with_params = true },
/// ]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FilterRef {
    Name(String),
    Configured {
        name: String,
        #[serde(flatten)]
        params: toml::Table,
    },
}

impl FilterRef {
    pub fn name(&self) -> &str {
        match self {
            FilterRef::Name(name) => name,
            FilterRef::Configured { name, .. } => name,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total request/response timeout in seconds.
    pub request_secs: u64,

    /// Deadline for one upstream exchange in seconds. Elapsing maps to a
    /// 504 at the gateway boundary.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 10,
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus metrics exporter.
    pub metrics_enabled: bool,

    /// Address the metrics endpoint binds to.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9100".to_string(),
        }
    }
}
