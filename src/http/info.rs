//! Service metadata, liveness and the diagnostic fallback.

use axum::http::{Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::http::response::timestamp;

/// `GET /`
pub async fn service_info() -> impl IntoResponse {
    Json(json!({
        "service": "Webhook Inspector API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Captures inbound webhooks per session and relays composer requests",
        "endpoints": {
            "POST /{sessionId}": "Record a webhook with a JSON body",
            "GET /{sessionId}": "Record a GET webhook, or list the session's captures with ?fetch_payloads=true and Accept: application/json",
            "PUT /{sessionId}": "Record a webhook (any body)",
            "PATCH /{sessionId}": "Record a webhook (any body)",
            "DELETE /{sessionId}": "Record a webhook (any body)",
            "POST /proxy": "Relay a composer request to an external URL",
            "GET /up": "Liveness check"
        },
        "timestamp": timestamp(),
        "status": "operational"
    }))
}

/// `GET /up`
pub async fn up() -> impl IntoResponse {
    Json(json!({ "status": "up", "timestamp": timestamp() }))
}

/// Anything no route matched.
pub async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    tracing::warn!(method = %method, path = %uri.path(), "Unmatched route");
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Frontend route accessed directly",
            "message": "This path is served by the dashboard, not the API. Check the deployment's routing configuration.",
            "timestamp": timestamp(),
            "path": uri.path(),
            "method": method.as_str(),
        })),
    )
}
