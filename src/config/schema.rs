//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML. Every section
//! carries `#[serde(default)]`, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, worker pool).
    pub listener: ListenerConfig,

    /// Client I/O timeouts.
    pub timeouts: TimeoutConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Song store settings.
    pub store: StoreConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Connections handled concurrently. Further connections wait in the backlog.
    pub pool_size: usize,

    /// Longest accepted request line, in bytes.
    pub max_request_line_bytes: usize,

    /// Upper bound on the header block, in bytes.
    pub max_header_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            pool_size: 10,
            max_request_line_bytes: 8 * 1024,
            max_header_bytes: 16 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for reading a request and writing its response, in seconds.
    /// Unset means a stalled client holds its worker until it disconnects.
    pub io_secs: Option<u64>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Song store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file holding the songs. Unset keeps songs in memory only.
    pub path: Option<String>,

    /// Load the sample catalogue when the store starts empty.
    pub seed_if_empty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            seed_if_empty: true,
        }
    }
}
