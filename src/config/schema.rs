//! Configuration file layout.
//!
//! Every section is optional in the file; whatever is omitted falls back
//! to the defaults below, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EdgeConfig {
    /// Listener configuration (bind address, connection ceiling).
    pub listener: ListenerConfig,

    /// Virtual host settings.
    pub server: ServerConfig,

    /// Static asset serving.
    #[serde(rename = "static")]
    pub static_files: StaticConfig,

    /// The application process behind the edge.
    pub upstream: UpstreamConfig,

    /// Request limits.
    pub limits: LimitsConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Where and how the edge accepts connections.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// TCP address to listen on, such as "127.0.0.1:8000".
    pub bind_address: String,

    /// Ceiling on simultaneously open connections. Accepts block once
    /// the ceiling is reached.
    pub max_connections: usize,

    /// Seconds an idle keep-alive connection is held open before the
    /// edge closes it. Zero disables keep-alive entirely.
    pub keepalive_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
            max_connections: 1024,
            keepalive_timeout_secs: 5,
        }
    }
}

/// Virtual host configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// The one Host the edge answers for. Requests carrying any other
    /// Host are dropped without a response. Compared case-insensitively,
    /// ignoring any `:port` suffix.
    pub server_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_name: "localhost".to_string(),
        }
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticConfig {
    /// URL prefix served from disk instead of the upstream.
    pub url_prefix: String,

    /// Filesystem directory the prefix aliases to. The prefix itself is
    /// stripped before the path is resolved under this root.
    pub root: String,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            url_prefix: "/static/".to_string(),
            root: "./static".to_string(),
        }
    }
}

/// Upstream application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Unix domain socket the application listens on.
    pub socket_path: String,

    /// Seconds allowed for the socket connect itself.
    pub connect_timeout_secs: u64,

    /// Seconds to wait for the upstream's response head.
    pub response_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            socket_path: "/tmp/club-app.sock".to_string(),
            connect_timeout_secs: 5,
            response_timeout_secs: 60,
        }
    }
}

/// Request limit configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes. Larger uploads are refused
    /// with 413 before the upstream is contacted.
    pub max_body_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 4 * 1024 * 1024, // 4 MiB
        }
    }
}

/// Logging and metrics knobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log level when RUST_LOG is not set.
    pub log_level: String,

    /// Whether to expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Address the scrape endpoint binds to.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
