//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

/// Host used when `GRPC_CONNECT_HOST` is not set.
pub const DEFAULT_HOST: &str = "localhost";

/// Base URL of the upstream food API.
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://chompthis.com/api/v2";

/// Listener configuration for the RPC server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConnectConfig {
    /// Host name or IP to bind (default: "localhost").
    pub host: String,

    /// TCP port to bind. Required; there is no default.
    pub port: u16,
}

impl ConnectConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// The `host:port` string the listener binds to.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Outbound API settings for the translation layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Base URL the `/food/branded/*.php` endpoints hang off.
    pub base_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
        }
    }
}
