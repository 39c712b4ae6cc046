//! Forwarding core.
//!
//! # Data Flow
//! ```text
//! platform adapter → InboundRequest
//!     → rewrite.rs (strip mount prefix, build target, filter headers)
//!     → ForwardedRequest
//!     → forwarder.rs (send via HTTP client, buffer body)
//!     → UpstreamResponse
//!     → platform adapter
//! ```
//!
//! # Design Decisions
//! - Bodies are fully buffered in both directions
//! - Redirects are relayed, never followed
//! - Transport failures become a fixed 502; no retries

pub mod forwarder;
pub mod rewrite;
pub mod types;

pub use forwarder::Forwarder;
pub use types::{ForwardedRequest, InboundRequest, UpstreamResponse};
