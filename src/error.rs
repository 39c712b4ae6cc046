//! Errors raised while adapting and forwarding a request.
//!
//! Every variant maps to a fixed status and a short plain-text body. Details
//! stay in the server logs.

use axum::http::StatusCode;
use thiserror::Error;

use crate::forward::UpstreamResponse;

/// Errors that can occur while handling one proxied request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Connecting to or exchanging with the backend failed.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    /// The backend did not answer within the configured bound.
    #[error("upstream did not respond within {0:?}")]
    UpstreamTimeout(std::time::Duration),

    /// The backend response body could not be read to completion.
    #[error("upstream body read failed: {0}")]
    UpstreamBody(axum::Error),

    /// The rewritten target could not be parsed as a URI.
    #[error("invalid forward target '{target}': {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: axum::http::uri::InvalidUri,
    },

    /// The inbound body exceeds the configured limit.
    #[error("request body of {size} bytes exceeds limit of {limit} bytes")]
    BodyTooLarge { size: usize, limit: usize },

    /// The inbound body could not be read.
    #[error("request body read failed: {0}")]
    RequestBody(axum::Error),

    /// The invocation event named an unknown HTTP method.
    #[error("invalid method '{0}'")]
    InvalidMethod(String),

    /// The invocation event carried a header that is not valid HTTP.
    #[error("invalid header '{0}'")]
    InvalidHeader(String),

    /// A body flagged as base64 did not decode.
    #[error("invalid base64 body: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The forwarder could not be built from the configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ProxyError {
    /// Status reported to the caller for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Upstream(_)
            | ProxyError::UpstreamTimeout(_)
            | ProxyError::UpstreamBody(_)
            | ProxyError::InvalidTarget { .. }
            | ProxyError::InvalidConfig(_) => StatusCode::BAD_GATEWAY,
            ProxyError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::RequestBody(_)
            | ProxyError::InvalidMethod(_)
            | ProxyError::InvalidHeader(_)
            | ProxyError::InvalidBase64(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Fixed caller-facing message for this error.
    pub fn public_message(&self) -> &'static str {
        match self.status() {
            StatusCode::BAD_GATEWAY => "Bad gateway",
            StatusCode::PAYLOAD_TOO_LARGE => "Payload too large",
            _ => "Bad request",
        }
    }

    /// Render the error as a response the platform adapters can relay.
    pub fn to_response(&self) -> UpstreamResponse {
        UpstreamResponse::text(self.status(), self.public_message())
    }
}

impl axum::response::IntoResponse for ProxyError {
    fn into_response(self) -> axum::response::Response {
        crate::platform::http::into_axum_response(self.to_response())
    }
}
