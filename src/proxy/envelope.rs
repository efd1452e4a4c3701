//! Normalized relay responses returned to the dashboard.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::capture::HeaderBag;

/// Outcome of a relay, as serialized to the composer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProxyEnvelope {
    Completed(CompletedRelay),
    Failed(FailedRelay),
}

/// The target answered (with any status).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedRelay {
    /// `true` when the target answered with a status below 400.
    pub success: bool,
    pub status: u16,
    pub status_text: String,
    pub data: Value,
    pub headers: HeaderBag,
    pub timestamp: String,
}

/// The relay could not be completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedRelay {
    pub success: bool,
    pub error: String,
    pub timestamp: String,
}

impl ProxyEnvelope {
    pub fn completed(status: u16, status_text: impl Into<String>, data: Value, headers: HeaderBag) -> Self {
        Self::Completed(CompletedRelay {
            success: status < 400,
            status,
            status_text: status_text.into(),
            data,
            headers,
            timestamp: now_timestamp(),
        })
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed(FailedRelay {
            success: false,
            error: error.into(),
            timestamp: now_timestamp(),
        })
    }
}

/// Current time as RFC 3339 with millisecond precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_completed_wire_shape() {
        let envelope = ProxyEnvelope::completed(404, "Not Found", json!("missing"), HeaderBag::new());
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["status"], 404);
        assert_eq!(json["statusText"], "Not Found");
        assert_eq!(json["data"], "missing");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_failed_wire_shape() {
        let json = serde_json::to_value(ProxyEnvelope::failed("Request timeout")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Request timeout");
        assert!(json.get("status").is_none());
    }
}
