//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.
//! MySQL settings are the exception: they only ever come from the environment.

use serde::{Deserialize, Serialize};

/// Default request body limit (20 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Root configuration for the API server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, proxy trust).
    pub listener: ListenerConfig,

    /// Ingress limits.
    pub limits: LimitsConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Generated API documentation.
    pub docs: DocsConfig,

    /// Log output settings.
    pub logging: LoggingConfig,

    /// Database settings, loaded from `MYSQL_*` environment variables.
    #[serde(skip)]
    pub mysql: MysqlConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Number of reverse-proxy hops trusted when resolving the client IP.
    pub trust_proxy_hops: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            trust_proxy_hops: 1,
        }
    }
}

/// Ingress limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes (inclusive).
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Length of the counting window in seconds.
    pub window_secs: u64,

    /// Requests allowed per client within one window.
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: 15 * 60,
            max_requests: 100,
        }
    }
}

/// OpenAPI document and Swagger UI settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Mount the Swagger UI.
    pub enabled: bool,

    /// Path the UI is served under. The JSON document lives at `{path}-json`.
    pub path: String,

    pub title: String,
    pub description: String,
    pub version: String,

    /// Extra tags advertised in the document.
    pub tags: Vec<String>,
}

impl DocsConfig {
    /// Location of the raw OpenAPI JSON document.
    pub fn json_path(&self) -> String {
        format!("{}-json", self.path.trim_end_matches('/'))
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/swagger/api".to_string(),
            title: "API reference".to_string(),
            description: "Generated from route metadata".to_string(),
            version: "1.0.0".to_string(),
            tags: Vec::new(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub filter: String,

    /// Colourise console output.
    pub ansi: bool,

    /// Label printed at the start of every line.
    pub layout_type: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            ansi: true,
            layout_type: "api".to_string(),
        }
    }
}

/// MySQL connection settings handed to the data layer.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MysqlConfig {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub conn_limit: Option<u32>,
}

impl std::fmt::Debug for MysqlConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MysqlConfig")
            .field("port", &self.port)
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("conn_limit", &self.conn_limit)
            .finish()
    }
}
