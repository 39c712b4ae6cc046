//! The forwarding transaction: rewrite, send, buffer, relay.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri};
use bytes::Bytes;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::{CorsConfig, ProxyConfig};
use crate::error::ProxyError;
use crate::forward::rewrite::{build_target, forwarded_headers, forwards_body, strip_mount_prefix};
use crate::forward::types::{ForwardedRequest, InboundRequest, UpstreamResponse};
use crate::observability::metrics;

/// Forwards requests under a mount prefix to a single backend origin.
///
/// Cheap to clone; clones share the HTTP client.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpsConnector<HttpConnector>, Body>,
    origin: Arc<str>,
    mount_prefix: Arc<str>,
    upstream_timeout: Duration,
    preflight: Option<Arc<HeaderMap>>,
}

impl Forwarder {
    /// Build a forwarder from validated configuration.
    pub fn new(config: &ProxyConfig) -> Result<Self, ProxyError> {
        // Another component may already have installed a provider.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        connector.set_nodelay(true);
        connector.enforce_http(false);

        let https = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(connector);

        // The legacy client never follows redirects.
        let client = Client::builder(TokioExecutor::new()).build(https);

        let preflight = if config.cors.preflight {
            Some(Arc::new(preflight_headers(&config.cors)?))
        } else {
            None
        };

        Ok(Self {
            client,
            origin: Arc::from(config.backend_origin()),
            mount_prefix: Arc::from(config.mount_prefix()),
            upstream_timeout: Duration::from_secs(config.timeouts.request_secs),
            preflight,
        })
    }

    /// Handle one inbound request. Never fails: errors become local responses.
    pub async fn handle(&self, inbound: InboundRequest) -> UpstreamResponse {
        let start_time = Instant::now();
        let method = inbound.method.clone();
        let method_str = method.to_string();

        if method == Method::OPTIONS {
            if let Some(headers) = &self.preflight {
                tracing::debug!(path = %inbound.path, "Answering preflight locally");
                metrics::record_request(&method_str, 200, start_time);
                return UpstreamResponse {
                    status: StatusCode::OK,
                    headers: headers.as_ref().clone(),
                    body: Bytes::new(),
                };
            }
        }

        let forwarded = match self.prepare(inbound) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(method = %method, error = %e, "Could not rewrite request");
                metrics::record_request(&method_str, e.status().as_u16(), start_time);
                return e.to_response();
            }
        };

        let target = forwarded.uri.to_string();
        tracing::debug!(method = %method, target = %target, "Forwarding request");

        match self.send(forwarded).await {
            Ok(response) => {
                tracing::debug!(
                    method = %method,
                    target = %target,
                    status = %response.status,
                    bytes = response.body.len(),
                    "Upstream responded"
                );
                metrics::record_request(&method_str, response.status.as_u16(), start_time);
                response
            }
            Err(e) => {
                tracing::error!(method = %method, target = %target, error = ?e, "Upstream error");
                metrics::record_upstream_error(&method_str);
                metrics::record_request(&method_str, e.status().as_u16(), start_time);
                e.to_response()
            }
        }
    }

    /// Rewrite an inbound request for the backend origin.
    pub fn prepare(&self, inbound: InboundRequest) -> Result<ForwardedRequest, ProxyError> {
        let path = strip_mount_prefix(&inbound.path, &self.mount_prefix);
        let target = build_target(&self.origin, &path, inbound.query.as_deref());
        let uri = Uri::try_from(target.as_str())
            .map_err(|source| ProxyError::InvalidTarget { target, source })?;

        let send_body = forwards_body(&inbound.method);
        let headers = forwarded_headers(&inbound.headers, inbound.body_reencoded || !send_body);

        let body = if send_body {
            Some(inbound.body.unwrap_or_default())
        } else {
            None
        };

        Ok(ForwardedRequest {
            method: inbound.method,
            uri,
            headers,
            body,
        })
    }

    /// Send and buffer the reply, bounded by the upstream timeout.
    async fn send(&self, forwarded: ForwardedRequest) -> Result<UpstreamResponse, ProxyError> {
        tokio::time::timeout(self.upstream_timeout, self.exchange(forwarded))
            .await
            .map_err(|_| ProxyError::UpstreamTimeout(self.upstream_timeout))?
    }

    async fn exchange(&self, forwarded: ForwardedRequest) -> Result<UpstreamResponse, ProxyError> {
        let response = self.client.request(forwarded.into_http()).await?;
        let (parts, body) = response.into_parts();

        let body = axum::body::to_bytes(Body::new(body), usize::MAX)
            .await
            .map_err(ProxyError::UpstreamBody)?;

        Ok(UpstreamResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}

fn preflight_headers(cors: &CorsConfig) -> Result<HeaderMap, ProxyError> {
    let value = |v: &str| {
        HeaderValue::from_str(v).map_err(|e| ProxyError::InvalidConfig(format!("cors header '{}': {}", v, e)))
    };

    let mut headers = HeaderMap::new();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value(&cors.allow_origin)?);
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, value(&cors.allow_methods)?);
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, value(&cors.allow_headers)?);
    Ok(headers)
}
