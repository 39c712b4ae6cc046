//! Raw HTTP platform: bodies arrive and leave as bytes.

use axum::body::Body;
use axum::http::{header, HeaderMap, Request};
use axum::response::Response;

use crate::error::ProxyError;
use crate::forward::{InboundRequest, UpstreamResponse};
use crate::platform::PlatformAdapter;

/// Adapter for hosts that hand over plain HTTP requests.
#[derive(Debug, Clone)]
pub struct RawHttpAdapter {
    max_body_bytes: usize,
}

impl RawHttpAdapter {
    pub fn new(max_body_bytes: usize) -> Self {
        Self { max_body_bytes }
    }
}

impl PlatformAdapter for RawHttpAdapter {
    type Request = Request<Body>;
    type Response = Response;

    async fn adapt_inbound(&self, request: Request<Body>) -> Result<InboundRequest, ProxyError> {
        let (parts, body) = request.into_parts();

        if let Some(size) = declared_length(&parts.headers) {
            if size > self.max_body_bytes {
                return Err(ProxyError::BodyTooLarge {
                    size,
                    limit: self.max_body_bytes,
                });
            }
        }

        let body = axum::body::to_bytes(body, self.max_body_bytes)
            .await
            .map_err(|e| body_error(e, self.max_body_bytes))?;

        Ok(InboundRequest {
            method: parts.method,
            path: parts.uri.path().to_string(),
            query: parts.uri.query().filter(|q| !q.is_empty()).map(str::to_string),
            headers: parts.headers,
            body: Some(body),
            body_reencoded: false,
        })
    }

    fn adapt_outbound(&self, response: UpstreamResponse) -> Response {
        into_axum_response(response)
    }
}

/// Relay status, every header and the raw body.
pub fn into_axum_response(upstream: UpstreamResponse) -> Response {
    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    *response.headers_mut() = upstream.headers;
    response
}

/// A body cut off by the length limit is too large, anything else is unreadable.
/// Past the limit only the first extra byte is known, so that is the size reported.
fn body_error(error: axum::Error, limit: usize) -> ProxyError {
    let hit_limit = std::error::Error::source(&error)
        .is_some_and(|source| source.is::<http_body_util::LengthLimitError>());
    if hit_limit {
        ProxyError::BodyTooLarge {
            size: limit + 1,
            limit,
        }
    } else {
        ProxyError::RequestBody(error)
    }
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
