//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: BACKEND_URL, PORT, PROXY_PLATFORM, ...)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → passed explicitly to the forwarder and server
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup and never reloaded
//! - All fields have defaults to allow running with no file at all
//! - A missing backend origin is not an error: the built-in fallback is used

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, BACKEND_ORIGIN_ENV};
pub use schema::{
    CorsConfig, HostPlatform, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    PlatformConfig, ProxyConfig, TimeoutConfig, UpstreamConfig, DEFAULT_BACKEND_ORIGIN,
};
