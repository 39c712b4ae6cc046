//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! forwarder / server produce:
//!     → logging.rs (structured log events, request-id spans)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → platform log drain (stdout)
//!     → metrics endpoint (Prometheus scrape), when enabled
//! ```

pub mod logging;
pub mod metrics;
