//! Response rendering for the capture endpoint.
//!
//! # Design Decisions
//! - Errors render as `{"error": "<message>"}` with the variant's status
//! - Server-side failures are logged here, once, at error level

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::json;

use crate::capture::CapturedRequest;
use crate::error::InspectorError;

impl IntoResponse for InspectorError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "Request failed");
        } else {
            tracing::debug!(error = %self, kind = self.kind(), "Request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Current time as RFC 3339 with millisecond precision.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `201 {success: true, payload}` for a created capture.
pub fn created(record: CapturedRequest) -> Response {
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "payload": record })),
    )
        .into_response()
}

/// `200 {success: true, message, payload}` for a recorded capture.
pub fn recorded(record: CapturedRequest) -> Response {
    let message = format!("{} request recorded", record.method);
    (
        StatusCode::OK,
        Json(json!({ "success": true, "message": message, "payload": record })),
    )
        .into_response()
}

/// `200 {payloads: [...]}` for a history poll.
pub fn history(records: Vec<CapturedRequest>) -> Response {
    (StatusCode::OK, Json(json!({ "payloads": records }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status() {
        let response = InspectorError::MissingIdentifier.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = InspectorError::InvalidPayload("Invalid JSON".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_timestamp_is_rfc3339_millis() {
        let stamp = timestamp();
        let parsed = chrono::DateTime::parse_from_rfc3339(&stamp).unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
        assert!(stamp.ends_with('Z'));
        assert_eq!(stamp.split('.').nth(1).map(str::len), Some(4));
    }
}
