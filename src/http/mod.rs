//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, platform routes)
//!     → request.rs (request id, span)
//!     → platform adapter (raw HTTP or envelope)
//!     → forwarder
//!     → platform adapter → client
//! ```

pub mod request;
pub mod server;

pub use request::{RequestId, X_REQUEST_ID};
pub use server::HttpServer;
