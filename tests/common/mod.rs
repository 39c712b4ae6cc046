//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, Method, Response, Uri},
    Router,
};
use bytes::Bytes;
use tokio::net::TcpListener;

use study_proxy::config::{HostPlatform, ProxyConfig};
use study_proxy::{HttpServer, Shutdown};

/// A request as seen by the stub backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Every request the stub backend received, in arrival order.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Recorded>>>);

impl Recorder {
    pub fn calls(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }

    pub fn last(&self) -> Recorded {
        self.calls().pop().expect("backend received no request")
    }
}

type Reply = Arc<dyn Fn(&Recorded) -> Response<Body> + Send + Sync>;

/// Start a stub backend on an ephemeral port answering with `reply`.
pub async fn start_stub_backend<F>(reply: F) -> (SocketAddr, Recorder)
where
    F: Fn(&Recorded) -> Response<Body> + Send + Sync + 'static,
{
    let recorder = Recorder::default();
    let state: (Recorder, Reply) = (recorder.clone(), Arc::new(reply));

    let app = Router::new().fallback(stub_handler).with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, recorder)
}

/// Stub backend echoing the request body with status 200.
pub async fn start_echo_backend() -> (SocketAddr, Recorder) {
    start_stub_backend(|req| {
        Response::builder()
            .status(200)
            .header("content-type", "application/octet-stream")
            .body(Body::from(req.body.clone()))
            .unwrap()
    })
    .await
}

async fn stub_handler(
    State((recorder, reply)): State<(Recorder, Reply)>,
    request: Request,
) -> Response<Body> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let recorded = Recorded {
        method: parts.method,
        uri: parts.uri,
        headers: parts.headers,
        body,
    };
    let response = (reply.as_ref())(&recorded);
    recorder.0.lock().unwrap().push(recorded);
    response
}

/// Backend that answers 200 "late" only after `delay`.
pub async fn start_slow_backend(delay: Duration) -> SocketAddr {
    let app = Router::new().fallback(move || async move {
        tokio::time::sleep(delay).await;
        "late"
    });
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

/// An address nothing is listening on.
pub fn unreachable_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Proxy configuration pointing at `backend`.
pub fn proxy_config(backend: SocketAddr, platform: HostPlatform) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.platform.kind = Some(platform);
    config.upstream.origin = Some(format!("http://{}", backend));
    config.timeouts.connect_secs = 2;
    config
}

/// Start the proxy on an ephemeral port.
pub async fn start_proxy(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Client that neither follows redirects nor uses system proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
