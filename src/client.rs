//! HTTP client for the ticketing backend services.
//!
//! Resolves a [`ServiceKey`] to its base URL, issues one request, measures
//! latency and parses the body defensively. HTTP error statuses are results,
//! not failures: only requests that never complete return an error.

use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, Result};
use crate::types::{HttpMethod, ServiceKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// One request to a named backend service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiCall {
    pub service: ServiceKey,
    pub method: HttpMethod,
    /// Path plus query string, e.g. `/orders/get?order_id=abc`
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ApiCall {
    pub fn get(service: ServiceKey, path: impl Into<String>) -> Self {
        Self {
            service,
            method: HttpMethod::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(service: ServiceKey, path: impl Into<String>, body: Value) -> Self {
        Self {
            service,
            method: HttpMethod::Post,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Normalized outcome of a completed request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCallResult {
    /// True iff the status is 2xx
    pub ok: bool,
    pub status: u16,
    pub duration_ms: u64,
    /// Parsed JSON, or the raw text when the body is not JSON
    pub data: Value,
}

/// Raw status and body as read off the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Network seam: sends one request and returns whatever the server answered.
///
/// Implementations must return `Ok` for every completed exchange regardless
/// of status, and `ConsoleError::Network` when no response was received.
pub trait HttpTransport: Send + Sync {
    fn send(&self, method: HttpMethod, url: &str, body: Option<&str>) -> Result<TransportResponse>;
}

/// [`HttpTransport`] backed by a blocking `ureq` agent
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl HttpTransport for UreqTransport {
    fn send(&self, method: HttpMethod, url: &str, body: Option<&str>) -> Result<TransportResponse> {
        let response = match method {
            HttpMethod::Get => self
                .agent
                .get(url)
                .header("Content-Type", "application/json")
                .call(),
            HttpMethod::Post => {
                let request = self
                    .agent
                    .post(url)
                    .header("Content-Type", "application/json");
                match body {
                    Some(body) => request.send(body),
                    None => request.send_empty(),
                }
            }
        }
        .map_err(|e| ConsoleError::network(format!("{} {}: {}", method, url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| ConsoleError::network(format!("reading response from {}: {}", url, e)))?;

        Ok(TransportResponse { status, body })
    }
}

/// Issues [`ApiCall`]s against the configured service base URLs
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    base_urls: BTreeMap<ServiceKey, String>,
}

impl ApiClient {
    /// Client using the real network transport
    pub fn from_config(config: &ConsoleConfig) -> Self {
        Self::with_transport(config, Arc::new(UreqTransport::new(config.request_timeout())))
    }

    /// Client using a caller-provided transport
    pub fn with_transport(config: &ConsoleConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let base_urls = ServiceKey::all()
            .into_iter()
            .filter_map(|key| config.base_url(key).map(|url| (key, url.to_string())))
            .collect();
        Self {
            transport,
            base_urls,
        }
    }

    /// Full URL for a call
    pub fn url_for(&self, call: &ApiCall) -> Result<String> {
        let base = self.base_urls.get(&call.service).ok_or_else(|| {
            ConsoleError::config(format!("no base URL configured for service '{}'", call.service))
        })?;
        Ok(format!("{}{}", base, call.path))
    }

    /// Issue a single request and normalize the result
    pub fn request(&self, call: &ApiCall) -> Result<ApiCallResult> {
        let url = self.url_for(call)?;
        let body = match (call.method, &call.body) {
            (HttpMethod::Post, Some(value)) => Some(serde_json::to_string(value)?),
            _ => None,
        };

        debug!("{} {}", call.method, url);
        let start = Instant::now();
        let response = self.transport.send(call.method, &url, body.as_deref())?;
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            service = %call.service,
            status = response.status,
            duration_ms,
            "{} {}",
            call.method,
            call.path
        );

        Ok(ApiCallResult {
            ok: (200..300).contains(&response.status),
            status: response.status,
            duration_ms,
            data: parse_body(&response.body),
        })
    }
}

/// Empty body is `null`, JSON is parsed, anything else is kept as raw text
pub fn parse_body(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Best-effort string rendering of a response body for error messages
pub fn render_body(data: &Value) -> String {
    match data {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Percent-encode a query value the way `encodeURIComponent` does.
///
/// Unreserved characters pass through; everything else is UTF-8 encoded as
/// uppercase `%XX` escapes.
pub fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct FixedTransport {
        status: u16,
        body: &'static str,
        seen: Mutex<Vec<(HttpMethod, String, Option<String>)>>,
    }

    impl HttpTransport for FixedTransport {
        fn send(&self, method: HttpMethod, url: &str, body: Option<&str>) -> Result<TransportResponse> {
            self.seen
                .lock()
                .unwrap()
                .push((method, url.to_string(), body.map(str::to_string)));
            Ok(TransportResponse {
                status: self.status,
                body: self.body.to_string(),
            })
        }
    }

    fn client(status: u16, body: &'static str) -> (ApiClient, Arc<FixedTransport>) {
        let transport = Arc::new(FixedTransport {
            status,
            body,
            seen: Mutex::new(Vec::new()),
        });
        (
            ApiClient::with_transport(&ConsoleConfig::default(), transport.clone()),
            transport,
        )
    }

    #[test]
    fn test_parse_body_variants() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body(r#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(parse_body("42"), json!(42));
        assert_eq!(parse_body("upstream timeout"), json!("upstream timeout"));
    }

    #[test]
    fn test_render_body() {
        assert_eq!(render_body(&json!("plain")), "plain");
        assert_eq!(render_body(&json!({"error": "x"})), r#"{"error":"x"}"#);
        assert_eq!(render_body(&Value::Null), "null");
    }

    #[test]
    fn test_encode_component() {
        assert_eq!(encode_component("G123|2026-02-11|2nd"), "G123%7C2026-02-11%7C2nd");
        assert_eq!(encode_component("a b"), "a%20b");
        assert_eq!(encode_component("it's (ok)!*~"), "it's%20(ok)!*~");
        assert_eq!(encode_component("a&b=c/d"), "a%26b%3Dc%2Fd");
        assert_eq!(encode_component("é"), "%C3%A9");
    }

    #[test]
    fn test_request_resolves_base_url_and_serializes_body() {
        let (client, transport) = client(201, r#"{"OrderID":"abc"}"#);
        let call = ApiCall::post(ServiceKey::Order, "/orders", json!({"amount_cents": 5}));

        let result = client.request(&call).unwrap();
        assert!(result.ok);
        assert_eq!(result.status, 201);
        assert_eq!(result.data, json!({"OrderID": "abc"}));

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].0, HttpMethod::Post);
        assert_eq!(seen[0].1, "http://127.0.0.1:8081/orders");
        assert_eq!(seen[0].2.as_deref(), Some(r#"{"amount_cents":5}"#));
    }

    #[test]
    fn test_get_never_sends_body() {
        let (client, transport) = client(200, "");
        let mut call = ApiCall::get(ServiceKey::Gateway, "/healthz");
        call.body = Some(json!({"ignored": true}));

        let result = client.request(&call).unwrap();
        assert_eq!(result.data, Value::Null);
        assert_eq!(transport.seen.lock().unwrap()[0].2, None);
    }

    #[test]
    fn test_error_status_is_not_a_failure() {
        let (client, _) = client(503, "service unavailable");
        let result = client
            .request(&ApiCall::get(ServiceKey::Worker, "/healthz"))
            .unwrap();
        assert!(!result.ok);
        assert_eq!(result.status, 503);
        assert_eq!(result.data, json!("service unavailable"));
    }
}
