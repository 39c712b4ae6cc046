//! Path, target and header rewriting rules.

use std::borrow::Cow;

use axum::http::{header, HeaderMap, Method};

/// Remove the mount prefix from an inbound path.
///
/// An empty remainder becomes `/`. Paths outside the mount are returned as-is.
pub fn strip_mount_prefix<'a>(path: &'a str, prefix: &str) -> Cow<'a, str> {
    match path.strip_prefix(prefix) {
        Some("") => Cow::Borrowed("/"),
        Some(rest) if rest.starts_with('/') => Cow::Borrowed(rest),
        // "/api/proxyfoo": keep the target a valid origin-relative path.
        Some(rest) => Cow::Owned(format!("/{}", rest)),
        None => Cow::Borrowed(path),
    }
}

/// Build `{origin}{path}{?query}`.
pub fn build_target(origin: &str, path: &str, query: Option<&str>) -> String {
    match query.filter(|q| !q.is_empty()) {
        Some(q) => format!("{}{}?{}", origin, path, q),
        None => format!("{}{}", origin, path),
    }
}

/// Whether the method forwards a request body.
pub fn forwards_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

/// Copy inbound headers for the upstream request.
///
/// `host` is always dropped. Framing headers are dropped when the body sent
/// upstream differs from the one received.
pub fn forwarded_headers(inbound: &HeaderMap, body_changed: bool) -> HeaderMap {
    let mut headers = inbound.clone();
    headers.remove(header::HOST);
    if body_changed {
        headers.remove(header::CONTENT_LENGTH);
        headers.remove(header::TRANSFER_ENCODING);
    }
    headers
}
