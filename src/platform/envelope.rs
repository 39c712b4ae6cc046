//! Base64 envelope platform.
//!
//! Requests arrive as JSON invocation events whose body is text, flagged with
//! `isBase64Encoded` when it carries binary data. Replies go back as JSON with
//! the body always base64-encoded and the flag set.

use std::collections::HashMap;

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ProxyError;
use crate::forward::{InboundRequest, UpstreamResponse};
use crate::platform::PlatformAdapter;

/// An invocation event as delivered by the host.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    pub http_method: String,
    pub path: String,
    #[serde(default)]
    pub raw_query_string: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Every value per header. Takes precedence over `headers` for a name.
    #[serde(default)]
    pub multi_value_headers: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

/// The reply envelope handed back to the host.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    /// Headers carrying a single value.
    pub headers: OrderedFields<String>,
    /// Headers carrying more than one value.
    #[serde(skip_serializing_if = "OrderedFields::is_empty")]
    pub multi_value_headers: OrderedFields<Vec<String>>,
    pub body: String,
    pub is_base64_encoded: bool,
}

/// Name/value pairs serialized as a JSON object in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedFields<V>(Vec<(String, V)>);

impl<V> Default for OrderedFields<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> OrderedFields<V> {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    fn push(&mut self, name: impl Into<String>, value: V) {
        self.0.push((name.into(), value));
    }
}

impl<V: Serialize> Serialize for OrderedFields<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Adapter for hosts using the base64 envelope convention.
#[derive(Debug, Clone)]
pub struct EnvelopeAdapter {
    max_body_bytes: usize,
}

impl EnvelopeAdapter {
    pub fn new(max_body_bytes: usize) -> Self {
        Self { max_body_bytes }
    }

    /// Decode an event into an inbound request.
    pub fn decode_event(&self, event: FunctionEvent) -> Result<InboundRequest, ProxyError> {
        let method = Method::from_bytes(event.http_method.as_bytes())
            .map_err(|_| ProxyError::InvalidMethod(event.http_method.clone()))?;

        let headers = event_headers(&event.headers, &event.multi_value_headers)?;

        let body = match event.body {
            Some(text) if event.is_base64_encoded => {
                Some(Bytes::from(STANDARD.decode(text.trim())?))
            }
            Some(text) => Some(Bytes::from(text)),
            None => None,
        };

        if let Some(body) = &body {
            if body.len() > self.max_body_bytes {
                return Err(ProxyError::BodyTooLarge {
                    size: body.len(),
                    limit: self.max_body_bytes,
                });
            }
        }

        Ok(InboundRequest {
            method,
            path: event.path,
            query: event.raw_query_string.filter(|q| !q.is_empty()),
            headers,
            body,
            body_reencoded: event.is_base64_encoded,
        })
    }

    /// Encode a response into the reply envelope.
    pub fn encode_response(&self, response: UpstreamResponse) -> FunctionResponse {
        let mut single = OrderedFields::default();
        let mut multi = OrderedFields::default();

        for name in response.headers.keys() {
            let mut values: Vec<String> = response
                .headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect();

            if values.len() == 1 {
                single.push(name.as_str(), values.remove(0));
            } else {
                multi.push(name.as_str(), values);
            }
        }

        FunctionResponse {
            status_code: response.status.as_u16(),
            headers: single,
            multi_value_headers: multi,
            body: STANDARD.encode(&response.body),
            is_base64_encoded: true,
        }
    }
}

impl PlatformAdapter for EnvelopeAdapter {
    type Request = FunctionEvent;
    type Response = FunctionResponse;

    async fn adapt_inbound(&self, event: FunctionEvent) -> Result<InboundRequest, ProxyError> {
        self.decode_event(event)
    }

    fn adapt_outbound(&self, response: UpstreamResponse) -> FunctionResponse {
        self.encode_response(response)
    }
}

fn event_headers(
    single: &HashMap<String, String>,
    multi: &HashMap<String, Vec<String>>,
) -> Result<HeaderMap, ProxyError> {
    let mut headers = HeaderMap::new();

    for (name, values) in multi {
        let name = header_name(name)?;
        for value in values {
            headers.append(name.clone(), header_value(&name, value)?);
        }
    }

    for (name, value) in single {
        let name = header_name(name)?;
        if headers.contains_key(&name) {
            continue;
        }
        let value = header_value(&name, value)?;
        headers.insert(name, value);
    }

    Ok(headers)
}

fn header_name(name: &str) -> Result<HeaderName, ProxyError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|_| ProxyError::InvalidHeader(name.to_string()))
}

fn header_value(name: &HeaderName, value: &str) -> Result<HeaderValue, ProxyError> {
    HeaderValue::from_str(value).map_err(|_| ProxyError::InvalidHeader(name.to_string()))
}
