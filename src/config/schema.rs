//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Backend origin used when neither the environment nor the config file names one.
pub const DEFAULT_BACKEND_ORIGIN: &str = "http://13.61.14.126:8000";

/// Root configuration for the forwarding proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Host platform convention and mount points.
    pub platform: PlatformConfig,

    /// Backend the proxy forwards to.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Inbound size limits.
    pub limits: LimitsConfig,

    /// Cross-origin preflight answers.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ProxyConfig {
    /// The backend origin, without a trailing slash.
    pub fn backend_origin(&self) -> &str {
        self.upstream
            .origin
            .as_deref()
            .map(|o| o.trim_end_matches('/'))
            .filter(|o| !o.is_empty())
            .unwrap_or(DEFAULT_BACKEND_ORIGIN)
    }

    /// The platform this process serves, defaulting to raw HTTP.
    pub fn host_platform(&self) -> HostPlatform {
        self.platform.kind.unwrap_or_default()
    }

    /// The mount prefix stripped from inbound paths.
    pub fn mount_prefix(&self) -> &str {
        self.platform
            .mount_prefix
            .as_deref()
            .unwrap_or_else(|| self.host_platform().default_mount_prefix())
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// How the hosting platform hands requests to the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HostPlatform {
    /// Plain HTTP requests with raw binary bodies.
    #[default]
    Http,
    /// JSON invocation events with base64-flagged text bodies.
    Envelope,
}

impl HostPlatform {
    /// Mount prefix used by each platform when none is configured.
    pub fn default_mount_prefix(self) -> &'static str {
        match self {
            HostPlatform::Http => "/api/proxy",
            HostPlatform::Envelope => "/.netlify/functions/proxy",
        }
    }

    /// Parse a platform name as accepted in `PROXY_PLATFORM`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "http" | "vercel" => Some(HostPlatform::Http),
            "envelope" | "netlify" => Some(HostPlatform::Envelope),
            _ => None,
        }
    }
}

impl std::fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostPlatform::Http => write!(f, "http"),
            HostPlatform::Envelope => write!(f, "envelope"),
        }
    }
}

/// Platform selection and mount points.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Pinned platform. Detected from the environment when absent.
    pub kind: Option<HostPlatform>,

    /// Path prefix the proxy is invoked under.
    pub mount_prefix: Option<String>,

    /// Endpoint receiving JSON invocation events (envelope platform only).
    pub invoke_path: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            kind: None,
            mount_prefix: None,
            invoke_path: "/invoke".to_string(),
        }
    }
}

/// Upstream backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Backend origin (scheme, host, optional port).
    pub origin: Option<String>,
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Bound on the whole backend exchange in seconds. Expiry is a 502.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 30,
        }
    }
}

/// Inbound request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum buffered request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 6 * 1024 * 1024,
        }
    }
}

/// Answers given to cross-origin preflight requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Answer `OPTIONS` locally instead of forwarding it.
    pub preflight: bool,

    pub allow_origin: String,
    pub allow_methods: String,
    pub allow_headers: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            preflight: true,
            allow_origin: "*".to_string(),
            allow_methods: "GET, POST, OPTIONS".to_string(),
            allow_headers: "Content-Type, Authorization".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
