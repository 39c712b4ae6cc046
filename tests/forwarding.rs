//! Raw HTTP forwarding against stub backends.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Response, StatusCode};
use study_proxy::config::HostPlatform;

mod common;

use common::{
    client, proxy_config, start_echo_backend, start_proxy, start_slow_backend, start_stub_backend,
};

#[tokio::test]
async fn test_strips_prefix_and_preserves_query() {
    let (backend, recorder) = start_echo_backend().await;
    let (proxy, shutdown) = start_proxy(proxy_config(backend, HostPlatform::Http)).await;

    let res = client()
        .get(format!("http://{}/api/proxy/api/study_material?a=1&b=two%20words", proxy))
        .send()
        .await
        .expect("Proxy unreachable");
    assert_eq!(res.status(), StatusCode::OK);

    let seen = recorder.last();
    assert_eq!(seen.uri.path(), "/api/study_material");
    assert_eq!(seen.uri.query(), Some("a=1&b=two%20words"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_no_query_means_no_question_mark() {
    let (backend, recorder) = start_echo_backend().await;
    let (proxy, shutdown) = start_proxy(proxy_config(backend, HostPlatform::Http)).await;

    client()
        .get(format!("http://{}/api/proxy/api/ask_question", proxy))
        .send()
        .await
        .unwrap();
    let seen = recorder.last();
    assert_eq!(seen.uri.to_string(), "/api/ask_question");

    client().get(format!("http://{}/api/proxy", proxy)).send().await.unwrap();
    assert_eq!(recorder.last().uri.to_string(), "/");

    client().get(format!("http://{}/api/proxy/", proxy)).send().await.unwrap();
    assert_eq!(recorder.last().uri.to_string(), "/");

    shutdown.trigger();
}

#[tokio::test]
async fn test_get_body_is_not_forwarded() {
    let (backend, recorder) = start_echo_backend().await;
    let (proxy, shutdown) = start_proxy(proxy_config(backend, HostPlatform::Http)).await;

    let res = client()
        .get(format!("http://{}/api/proxy/api/items", proxy))
        .body("should not arrive")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let seen = recorder.last();
    assert_eq!(seen.method, Method::GET);
    assert!(seen.body.is_empty());
    assert!(seen.headers.get("content-length").map_or(true, |v| v == "0"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_binary_pdf_round_trip() {
    let (backend, recorder) = start_echo_backend().await;
    let (proxy, shutdown) = start_proxy(proxy_config(backend, HostPlatform::Http)).await;

    let mut pdf = b"%PDF-1.7\n".to_vec();
    pdf.extend((0..=255u8).cycle().take(64 * 1024));
    pdf.extend_from_slice(b"\n%%EOF");

    let res = client()
        .post(format!("http://{}/api/proxy/api/study_material", proxy))
        .header("content-type", "application/pdf")
        .body(pdf.clone())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let echoed = res.bytes().await.unwrap();
    assert_eq!(echoed.as_ref(), pdf.as_slice());

    let seen = recorder.last();
    assert_eq!(seen.method, Method::POST);
    assert_eq!(seen.body.as_ref(), pdf.as_slice());
    assert_eq!(seen.headers.get("content-type").unwrap(), "application/pdf");

    shutdown.trigger();
}

#[tokio::test]
async fn test_host_header_is_recomputed_for_backend() {
    let (backend, recorder) = start_echo_backend().await;
    let (proxy, shutdown) = start_proxy(proxy_config(backend, HostPlatform::Http)).await;

    client()
        .post(format!("http://{}/api/proxy/api/ask_question", proxy))
        .header("authorization", "Bearer token")
        .json(&serde_json::json!({ "text": "t", "question": "q" }))
        .send()
        .await
        .unwrap();

    let seen = recorder.last();
    assert_eq!(seen.headers.get("host").unwrap(), backend.to_string().as_str());
    assert_ne!(seen.headers.get("host").unwrap(), proxy.to_string().as_str());
    assert_eq!(seen.headers.get("authorization").unwrap(), "Bearer token");
    assert_eq!(seen.headers.get("content-type").unwrap(), "application/json");

    shutdown.trigger();
}

#[tokio::test]
async fn test_status_and_headers_relayed() {
    let (backend, _) = start_stub_backend(|_| {
        Response::builder()
            .status(404)
            .header("x-test", "1")
            .header("set-cookie", "a=1")
            .header("set-cookie", "b=2")
            .body(Body::from("not here"))
            .unwrap()
    })
    .await;
    let (proxy, shutdown) = start_proxy(proxy_config(backend, HostPlatform::Http)).await;

    let res = client()
        .get(format!("http://{}/api/proxy/api/missing", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers().get("x-test").unwrap(), "1");
    assert_eq!(res.headers().get_all("set-cookie").iter().count(), 2);
    assert_eq!(res.text().await.unwrap(), "not here");

    shutdown.trigger();
}

#[tokio::test]
async fn test_redirect_passed_through() {
    let (backend, recorder) = start_stub_backend(|_| {
        Response::builder()
            .status(302)
            .header("location", "/api/elsewhere")
            .body(Body::empty())
            .unwrap()
    })
    .await;
    let (proxy, shutdown) = start_proxy(proxy_config(backend, HostPlatform::Http)).await;

    let res = client()
        .get(format!("http://{}/api/proxy/api/old", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers().get("location").unwrap(), "/api/elsewhere");
    assert_eq!(recorder.calls().len(), 1, "Proxy must not follow the redirect");

    shutdown.trigger();
}

#[tokio::test]
async fn test_multi_value_request_headers_preserved() {
    let (backend, recorder) = start_echo_backend().await;
    let (proxy, shutdown) = start_proxy(proxy_config(backend, HostPlatform::Http)).await;

    client()
        .get(format!("http://{}/api/proxy/api/items", proxy))
        .header("x-multi", "one")
        .header("x-multi", "two")
        .send()
        .await
        .unwrap();

    let seen = recorder.last();
    let values: Vec<_> = seen.headers.get_all("x-multi").iter().collect();
    assert_eq!(values, vec!["one", "two"]);

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_backend_returns_bad_gateway() {
    let backend = common::unreachable_addr();
    let (proxy, shutdown) = start_proxy(proxy_config(backend, HostPlatform::Http)).await;

    let res = client()
        .post(format!("http://{}/api/proxy/api/study_material", proxy))
        .body("payload")
        .send()
        .await
        .expect("Proxy must answer even when the backend is down");

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body = res.text().await.unwrap();
    assert_eq!(body, "Bad gateway");

    // The proxy keeps serving after the failure.
    let res = client()
        .get(format!("http://{}/api/proxy/api/again", proxy))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

    shutdown.trigger();
}

#[tokio::test]
async fn test_slow_backend_returns_bad_gateway() {
    let backend = start_slow_backend(Duration::from_millis(1500)).await;
    let mut config = proxy_config(backend, HostPlatform::Http);
    config.timeouts.request_secs = 1;
    let (proxy, shutdown) = start_proxy(config).await;

    let res = client()
        .post(format!("http://{}/api/proxy/api/study_material", proxy))
        .body("pdf bytes")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(res.text().await.unwrap(), "Bad gateway");

    shutdown.trigger();
}

#[tokio::test]
async fn test_tls_failure_returns_bad_gateway() {
    // A plain HTTP listener cannot complete a TLS handshake.
    let (backend, _) = start_echo_backend().await;
    let mut config = proxy_config(backend, HostPlatform::Http);
    config.upstream.origin = Some(format!("https://{}", backend));
    let (proxy, shutdown) = start_proxy(config).await;

    let res = client()
        .get(format!("http://{}/api/proxy/api/items", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(res.text().await.unwrap(), "Bad gateway");

    shutdown.trigger();
}

#[tokio::test]
async fn test_options_preflight_skips_backend() {
    let (backend, recorder) = start_echo_backend().await;
    let (proxy, shutdown) = start_proxy(proxy_config(backend, HostPlatform::Http)).await;

    let res = client()
        .request(Method::OPTIONS, format!("http://{}/api/proxy/api/study_material", proxy))
        .header("origin", "https://frontend.example")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("access-control-allow-origin").unwrap(), "*");
    assert_eq!(
        res.headers().get("access-control-allow-methods").unwrap(),
        "GET, POST, OPTIONS"
    );
    assert_eq!(
        res.headers().get("access-control-allow-headers").unwrap(),
        "Content-Type, Authorization"
    );
    assert!(recorder.calls().is_empty(), "Backend must receive zero calls");

    shutdown.trigger();
}

#[tokio::test]
async fn test_options_forwarded_when_preflight_disabled() {
    let (backend, recorder) = start_echo_backend().await;
    let mut config = proxy_config(backend, HostPlatform::Http);
    config.cors.preflight = false;
    let (proxy, shutdown) = start_proxy(config).await;

    client()
        .request(Method::OPTIONS, format!("http://{}/api/proxy/api/x", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(recorder.last().method, Method::OPTIONS);

    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_body_rejected_before_forwarding() {
    let (backend, recorder) = start_echo_backend().await;
    let mut config = proxy_config(backend, HostPlatform::Http);
    config.limits.max_body_bytes = 16;
    let (proxy, shutdown) = start_proxy(config).await;

    let res = client()
        .post(format!("http://{}/api/proxy/api/study_material", proxy))
        .body(vec![7u8; 64])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(recorder.calls().is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn test_custom_mount_prefix() {
    let (backend, recorder) = start_echo_backend().await;
    let mut config = proxy_config(backend, HostPlatform::Http);
    config.platform.mount_prefix = Some("/edge/fn".into());
    let (proxy, shutdown) = start_proxy(config).await;

    let res = client()
        .get(format!("http://{}/edge/fn/api/recommend_videos", proxy))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(recorder.last().uri.path(), "/api/recommend_videos");

    let res = client()
        .get(format!("http://{}/api/proxy/api/recommend_videos", proxy))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    shutdown.trigger();
}
