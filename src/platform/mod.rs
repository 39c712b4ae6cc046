//! Host platform adapters.
//!
//! Each hosting convention only differs in how a request arrives and how the
//! reply must be shaped. Adapters translate both directions so the forwarder
//! sees one request type.
//!
//! ```text
//! platform request → adapt_inbound → InboundRequest
//!                                      → Forwarder::handle
//! platform response ← adapt_outbound ← UpstreamResponse
//! ```

use std::future::Future;

use crate::error::ProxyError;
use crate::forward::{Forwarder, InboundRequest, UpstreamResponse};

pub mod envelope;
pub mod http;

pub use envelope::{EnvelopeAdapter, FunctionEvent, FunctionResponse};
pub use http::RawHttpAdapter;

/// Translation between a platform's request/response shapes and the forwarder's.
pub trait PlatformAdapter: Send + Sync {
    type Request: Send;
    type Response;

    /// Convert a platform request into an inbound request.
    fn adapt_inbound(
        &self,
        request: Self::Request,
    ) -> impl Future<Output = Result<InboundRequest, ProxyError>> + Send;

    /// Convert a buffered response into the platform's reply.
    fn adapt_outbound(&self, response: UpstreamResponse) -> Self::Response;
}

/// Run one platform request through the forwarder.
///
/// Adapter failures are rendered through `adapt_outbound` like any other reply.
pub async fn serve<A: PlatformAdapter>(
    adapter: &A,
    forwarder: &Forwarder,
    request: A::Request,
) -> A::Response {
    let response = match adapter.adapt_inbound(request).await {
        Ok(inbound) => forwarder.handle(inbound).await,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected inbound request");
            e.to_response()
        }
    };
    adapter.adapt_outbound(response)
}
