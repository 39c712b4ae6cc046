//! Study-material forwarding proxy.
//!
//! Relays requests received under a mount prefix to a single backend origin
//! and hands the backend's reply back unchanged, under either a raw HTTP or a
//! base64 envelope hosting convention.

pub mod config;
pub mod error;
pub mod forward;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod platform;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use forward::Forwarder;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
