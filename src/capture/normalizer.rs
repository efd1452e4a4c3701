//! Request normalization.
//!
//! # Responsibilities
//! - Parse the body as JSON, strictly or leniently
//! - Collect inbound headers into a `HeaderBag`
//! - Flatten the query string
//! - Resolve client IP and user agent
//!
//! # Design Decisions
//! - Pure: identical input gives identical output, no I/O
//! - Only wire headers are collected; request ids and connection info
//!   live in request extensions and never reach the record
//! - Whitespace-only bodies count as empty

use std::net::SocketAddr;

use axum::http::{header, HeaderMap, Method};
use serde_json::Value;

use crate::capture::record::{HeaderBag, HeaderValue, NewCapture, QueryParams};
use crate::error::{InspectorError, InspectorResult};

/// How a body that fails to parse as JSON is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPolicy {
    /// Invalid JSON is rejected with `InvalidPayload`.
    Strict,
    /// Invalid JSON is kept as the raw string.
    Lenient,
    /// The body is ignored and recorded as null.
    Discard,
}

/// Raw inbound request parts handed to the normalizer.
#[derive(Debug, Clone, Copy)]
pub struct RawRequest<'a> {
    pub method: &'a Method,
    pub headers: &'a HeaderMap,
    pub body: &'a [u8],
    pub query: Option<&'a str>,
    pub remote_addr: Option<SocketAddr>,
}

/// Converts raw requests into `NewCapture` values.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    trust_forwarded_for: bool,
}

impl Normalizer {
    pub fn new(trust_forwarded_for: bool) -> Self {
        Self {
            trust_forwarded_for,
        }
    }

    pub fn trusts_forwarded_for(&self) -> bool {
        self.trust_forwarded_for
    }

    /// Normalize `raw` into a record for `session_id`.
    pub fn normalize(
        &self,
        session_id: &str,
        raw: RawRequest<'_>,
        policy: BodyPolicy,
    ) -> InspectorResult<NewCapture> {
        let body = parse_body(raw.body, policy)?;

        Ok(NewCapture {
            session_id: session_id.to_string(),
            method: raw.method.as_str().to_ascii_uppercase(),
            body,
            headers: collect_headers(raw.headers),
            query_params: parse_query(raw.query),
            ip_address: client_ip(raw.headers, raw.remote_addr, self.trust_forwarded_for),
            user_agent: header_str(raw.headers, header::USER_AGENT.as_str()),
            content_type: header_str(raw.headers, header::CONTENT_TYPE.as_str()),
        })
    }
}

/// Parse a request body according to `policy`.
pub fn parse_body(body: &[u8], policy: BodyPolicy) -> InspectorResult<Option<Value>> {
    if policy == BodyPolicy::Discard || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(value) => Ok(Some(value)),
        Err(err) => match policy {
            BodyPolicy::Strict => {
                tracing::debug!(error = %err, "Rejecting body that is not valid JSON");
                Err(InspectorError::InvalidPayload("Invalid JSON".to_string()))
            }
            _ => Ok(Some(Value::String(
                String::from_utf8_lossy(body).into_owned(),
            ))),
        },
    }
}

/// Collect every inbound header, grouping repeated names.
pub fn collect_headers(headers: &HeaderMap) -> HeaderBag {
    let mut bag = HeaderBag::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match bag.get_mut(name.as_str()) {
            Some(existing) => existing.push(value),
            None => {
                bag.insert(name.as_str().to_string(), HeaderValue::Single(value));
            }
        }
    }
    bag
}

/// Flatten a raw query string into a key/value map.
pub fn parse_query(query: Option<&str>) -> QueryParams {
    query
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}

/// Resolve the client IP.
///
/// With `trust_forwarded_for` the left-most `X-Forwarded-For` entry wins;
/// otherwise the peer address is used.
pub fn client_ip(
    headers: &HeaderMap,
    remote_addr: Option<SocketAddr>,
    trust_forwarded_for: bool,
) -> Option<String> {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return Some(ip.to_string());
        }
    }
    remote_addr.map(|addr| addr.ip().to_string())
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue as WireValue;
    use serde_json::json;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, WireValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_strict_rejects_invalid_json() {
        let err = parse_body(b"{not json", BodyPolicy::Strict).unwrap_err();
        assert!(matches!(err, InspectorError::InvalidPayload(_)));
    }

    #[test]
    fn test_lenient_keeps_raw_string() {
        let body = parse_body(b"hello=world&x=1", BodyPolicy::Lenient).unwrap();
        assert_eq!(body, Some(Value::String("hello=world&x=1".into())));
    }

    #[test]
    fn test_empty_and_blank_bodies_are_null() {
        assert_eq!(parse_body(b"", BodyPolicy::Strict).unwrap(), None);
        assert_eq!(parse_body(b"  \n", BodyPolicy::Lenient).unwrap(), None);
        assert_eq!(parse_body(b"{\"a\":1}", BodyPolicy::Discard).unwrap(), None);
    }

    #[test]
    fn test_json_scalars_and_arrays_parse() {
        assert_eq!(
            parse_body(b"[1,2]", BodyPolicy::Strict).unwrap(),
            Some(json!([1, 2]))
        );
        assert_eq!(parse_body(b"42", BodyPolicy::Lenient).unwrap(), Some(json!(42)));
    }

    #[test]
    fn test_repeated_headers_are_grouped() {
        let map = headers(&[
            ("x-tag", "one"),
            ("x-tag", "two"),
            ("content-type", "application/json"),
        ]);
        let bag = collect_headers(&map);
        assert_eq!(
            bag.get("x-tag"),
            Some(&HeaderValue::Multiple(vec!["one".into(), "two".into()]))
        );
        assert_eq!(
            bag.get("content-type"),
            Some(&HeaderValue::Single("application/json".into()))
        );
    }

    #[test]
    fn test_query_last_value_wins() {
        let params = parse_query(Some("a=1&b=two%20words&a=3"));
        assert_eq!(params.get("a").map(String::as_str), Some("3"));
        assert_eq!(params.get("b").map(String::as_str), Some("two words"));
        assert!(parse_query(None).is_empty());
    }

    #[test]
    fn test_client_ip_forwarded_for_only_when_trusted() {
        let map = headers(&[("x-forwarded-for", "203.0.113.9, 10.0.0.1")]);
        let peer: SocketAddr = "127.0.0.1:5555".parse().unwrap();
        assert_eq!(client_ip(&map, Some(peer), false).as_deref(), Some("127.0.0.1"));
        assert_eq!(client_ip(&map, Some(peer), true).as_deref(), Some("203.0.113.9"));
        assert_eq!(client_ip(&HeaderMap::new(), None, true), None);
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let map = headers(&[
            ("user-agent", "curl/8.0"),
            ("content-type", "application/json"),
        ]);
        let method = Method::PUT;
        let raw = RawRequest {
            method: &method,
            headers: &map,
            body: b"{\"event\":\"test\"}",
            query: Some("source=ci"),
            remote_addr: Some("10.1.2.3:80".parse().unwrap()),
        };
        let normalizer = Normalizer::default();
        let first = normalizer.normalize("abc123", raw, BodyPolicy::Lenient).unwrap();
        let second = normalizer.normalize("abc123", raw, BodyPolicy::Lenient).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.method, "PUT");
        assert_eq!(first.body, Some(json!({ "event": "test" })));
        assert_eq!(first.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(first.content_type.as_deref(), Some("application/json"));
        assert_eq!(first.ip_address.as_deref(), Some("10.1.2.3"));
        assert_eq!(first.query_params.get("source").map(String::as_str), Some("ci"));
    }
}
