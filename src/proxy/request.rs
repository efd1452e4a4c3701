//! Composer request parsing and validation.

use axum::http::Method;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::capture::HeaderBag;
use crate::error::{InspectorError, InspectorResult};

/// The relay description sent by the dashboard composer.
#[derive(Debug, Clone, Deserialize)]
pub struct ComposerRequest {
    pub url: Option<String>,
    pub method: Option<String>,
    #[serde(default)]
    pub headers: Option<HeaderBag>,
    #[serde(default)]
    pub body: Option<Value>,
}

/// A composer request that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub url: Url,
    pub method: Method,
    pub headers: HeaderBag,
    pub body: Option<Value>,
}

impl ValidatedRequest {
    /// Content type the caller asked for, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .and_then(|(_, value)| value.values().first().copied())
    }

    /// Whether a JSON body should be attached to the outbound call.
    ///
    /// Only non-empty objects and arrays are sent, and never on GET/HEAD.
    pub fn sends_body(&self) -> bool {
        if self.method == Method::GET || self.method == Method::HEAD {
            return false;
        }
        match &self.body {
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            _ => false,
        }
    }
}

/// Parse and validate a raw `/proxy` body.
pub fn parse_composer_request(body: &[u8]) -> InspectorResult<ValidatedRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(InspectorError::MissingBody);
    }

    let request: ComposerRequest = serde_json::from_slice(body)
        .map_err(|e| InspectorError::InvalidPayload(format!("Invalid JSON: {e}")))?;

    let url = request
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(InspectorError::InvalidUrl)?;
    let url = Url::parse(url).map_err(|_| InspectorError::InvalidUrl)?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(InspectorError::InvalidUrl);
    }

    let method = request
        .method
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or("GET")
        .to_ascii_uppercase();
    let method = Method::from_bytes(method.as_bytes())
        .map_err(|_| InspectorError::InvalidPayload(format!("Unsupported HTTP method: {method}")))?;

    Ok(ValidatedRequest {
        url,
        method,
        headers: request.headers.unwrap_or_default(),
        body: request.body.filter(|b| !b.is_null()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> InspectorResult<ValidatedRequest> {
        parse_composer_request(value.to_string().as_bytes())
    }

    #[test]
    fn test_empty_body_is_missing() {
        assert!(matches!(
            parse_composer_request(b""),
            Err(InspectorError::MissingBody)
        ));
    }

    #[test]
    fn test_malformed_json_is_invalid_payload() {
        assert!(matches!(
            parse_composer_request(b"{url:"),
            Err(InspectorError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_url_must_be_absolute_http() {
        for url in ["not-a-url", "ftp://example.com/x", "/relative", ""] {
            assert!(
                matches!(parse(json!({ "url": url })), Err(InspectorError::InvalidUrl)),
                "{url} should be rejected"
            );
        }
        assert!(matches!(parse(json!({})), Err(InspectorError::InvalidUrl)));
    }

    #[test]
    fn test_method_defaults_to_get_and_is_uppercased() {
        let req = parse(json!({ "url": "https://example.com" })).unwrap();
        assert_eq!(req.method, Method::GET);
        let req = parse(json!({ "url": "https://example.com", "method": "patch" })).unwrap();
        assert_eq!(req.method, Method::PATCH);
    }

    #[test]
    fn test_sends_body_only_for_non_empty_collections() {
        let with = |method: &str, body: Value| {
            parse(json!({ "url": "http://example.com", "method": method, "body": body }))
                .unwrap()
                .sends_body()
        };
        assert!(with("POST", json!({ "a": 1 })));
        assert!(with("PUT", json!([1])));
        assert!(!with("POST", json!({})));
        assert!(!with("POST", json!([])));
        assert!(!with("GET", json!({ "a": 1 })));
        assert!(!with("POST", json!("text")));
    }

    #[test]
    fn test_content_type_lookup_is_case_insensitive() {
        let req = parse(json!({
            "url": "http://example.com",
            "headers": { "Content-Type": "text/plain" }
        }))
        .unwrap();
        assert_eq!(req.content_type(), Some("text/plain"));
    }
}
