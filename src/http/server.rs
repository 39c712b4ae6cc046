//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router for the configured host platform
//! - Wire up middleware (request id, tracing)
//! - Hand requests to the platform adapter and forwarder
//! - Serve until the shutdown signal fires

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::{HostPlatform, ProxyConfig};
use crate::error::ProxyError;
use crate::forward::Forwarder;
use crate::http::request::request_id;
use crate::platform::{self, EnvelopeAdapter, FunctionEvent, RawHttpAdapter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Forwarder,
    pub http: Arc<RawHttpAdapter>,
    pub envelope: Arc<EnvelopeAdapter>,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        let forwarder = Forwarder::new(&config)?;
        let state = AppState {
            forwarder,
            http: Arc::new(RawHttpAdapter::new(config.limits.max_body_bytes)),
            envelope: Arc::new(EnvelopeAdapter::new(config.limits.max_body_bytes)),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let routes = match config.host_platform() {
            HostPlatform::Http => {
                let prefix = config.mount_prefix();
                Router::new()
                    .route(prefix, any(proxy_handler))
                    .route(&format!("{}/", prefix), any(proxy_handler))
                    .route(&format!("{}/{{*rest}}", prefix), any(proxy_handler))
            }
            HostPlatform::Envelope => {
                Router::new().route(&config.platform.invoke_path, post(invoke_handler))
            }
        };

        routes
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(request_id))
    }

    /// The router, for serving in-process without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal is received.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            platform = %self.config.host_platform(),
            mount_prefix = %self.config.mount_prefix(),
            origin = %self.config.backend_origin(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Raw HTTP platform: the request itself is what gets forwarded.
async fn proxy_handler(State(state): State<AppState>, request: Request) -> Response {
    platform::serve(state.http.as_ref(), &state.forwarder, request).await
}

/// Envelope platform: the request body is an invocation event.
async fn invoke_handler(
    State(state): State<AppState>,
    Json(event): Json<FunctionEvent>,
) -> impl IntoResponse {
    Json(platform::serve(state.envelope.as_ref(), &state.forwarder, event).await)
}
