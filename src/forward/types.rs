//! Request-scoped values flowing through the forwarder.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode, Uri};
use bytes::Bytes;

/// A request as received from the host platform, before rewriting.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    /// Request path, still carrying the mount prefix.
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    /// The adapter decoded the body, so its framing headers no longer apply.
    pub body_reencoded: bool,
}

impl InboundRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: HeaderMap::new(),
            body: None,
            body_reencoded: false,
        }
    }

    /// Set the query string. An empty string means no query.
    pub fn with_query(mut self, query: Option<&str>) -> Self {
        self.query = query.filter(|q| !q.is_empty()).map(str::to_string);
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A request rewritten for the backend origin.
#[derive(Debug, Clone)]
pub struct ForwardedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    /// `None` for methods that never carry a body upstream.
    pub body: Option<Bytes>,
}

impl ForwardedRequest {
    /// Convert into a request for the HTTP client.
    pub fn into_http(self) -> Request<Body> {
        let body = match self.body {
            Some(bytes) => Body::from(bytes),
            None => Body::empty(),
        };
        let mut request = Request::new(body);
        *request.method_mut() = self.method;
        *request.uri_mut() = self.uri;
        *request.headers_mut() = self.headers;
        request
    }
}

/// A fully buffered backend reply, or a locally generated one.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamResponse {
    /// A plain-text response produced by the proxy itself.
    pub fn text(status: StatusCode, message: &'static str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        Self {
            status,
            headers,
            body: Bytes::from_static(message.as_bytes()),
        }
    }
}
