//! Request identification.
//!
//! Every inbound request gets an id for log correlation. A caller-supplied
//! `x-request-id` is reused; otherwise a UUID v4 is generated. The id lives in
//! the request span only, so the headers forwarded upstream stay exactly as
//! received.

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

/// Header consulted for a caller-supplied request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request id recorded on each request's span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    fn from_request(request: &Request) -> Self {
        request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| RequestId(v.to_string()))
            .unwrap_or_else(|| RequestId(Uuid::new_v4().to_string()))
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Middleware assigning a request id and wrapping the request in a span.
pub async fn request_id(request: Request, next: Next) -> Response {
    let id = RequestId::from_request(&request);
    let span = tracing::info_span!(
        "request",
        request_id = %id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    next.run(request).instrument(span).await
}
