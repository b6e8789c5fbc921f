//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the readiness daemon.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Execution client endpoints.
    pub execution: ClientEndpointConfig,

    /// Beacon Node endpoints.
    pub consensus: ClientEndpointConfig,

    /// Client status API settings.
    pub api: ApiConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            execution: ClientEndpointConfig::with_primary("http://localhost:8545"),
            consensus: ClientEndpointConfig::with_primary("http://localhost:5052"),
            api: ApiConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Primary and optional fallback endpoint for one client kind.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientEndpointConfig {
    /// Primary client URL.
    pub primary_url: String,

    /// Fallback client URL; no fallback when absent.
    #[serde(default)]
    pub fallback_url: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_client_timeout_secs")]
    pub timeout_secs: u64,
}

impl ClientEndpointConfig {
    pub fn with_primary(url: &str) -> Self {
        Self {
            primary_url: url.to_string(),
            fallback_url: None,
            timeout_secs: default_client_timeout_secs(),
        }
    }
}

fn default_client_timeout_secs() -> u64 {
    10
}

/// Client status API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Serve the status API.
    pub enabled: bool,

    /// Bind address (e.g., "127.0.0.1:8081").
    pub bind_address: String,

    /// Bearer token required on every request; open when unset.
    pub api_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:8081".to_string(),
            api_key: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
