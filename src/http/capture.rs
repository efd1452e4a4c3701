//! Handlers for `/{sessionId}`.
//!
//! POST parses strictly, PUT/PATCH/DELETE leniently, and GET either
//! returns the session's history or records itself, depending on
//! `IntentRules`.

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, Method};
use axum::response::Response;

use crate::capture::normalizer::parse_query;
use crate::capture::{BodyPolicy, CapturedRequest, GetIntent, RawRequest};
use crate::error::{InspectorError, InspectorResult};
use crate::http::request::PeerAddr;
use crate::http::response;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::store::with_store;

/// `POST /{sessionId}`
pub async fn create(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    method: Method,
    PeerAddr(peer): PeerAddr,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> InspectorResult<Response> {
    let raw = RawRequest {
        method: &method,
        headers: &headers,
        body: &body,
        query: query.as_deref(),
        remote_addr: peer,
    };
    let record = store_capture(&state, &session_id, raw, BodyPolicy::Strict).await?;
    Ok(response::created(record))
}

/// `GET /{sessionId}`
pub async fn fetch_or_record(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    method: Method,
    PeerAddr(peer): PeerAddr,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> InspectorResult<Response> {
    let session_id = require_session(&session_id)?;
    let params = parse_query(query.as_deref());

    match state.intent.classify(&headers, &params) {
        GetIntent::Retrieve => {
            let key = session_id.to_string();
            let records = with_store(&state.store, move |store| store.query(&key)).await?;
            tracing::debug!(session_id = %session_id, count = records.len(), "History served");
            metrics::record_retrieval(records.len());
            Ok(response::history(records))
        }
        GetIntent::Capture => {
            let raw = RawRequest {
                method: &method,
                headers: &headers,
                body: &[],
                query: query.as_deref(),
                remote_addr: peer,
            };
            let record = store_capture(&state, session_id, raw, BodyPolicy::Discard).await?;
            Ok(response::recorded(record))
        }
    }
}

/// `PUT`, `PATCH` and `DELETE /{sessionId}`
pub async fn record(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    method: Method,
    PeerAddr(peer): PeerAddr,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> InspectorResult<Response> {
    let raw = RawRequest {
        method: &method,
        headers: &headers,
        body: &body,
        query: query.as_deref(),
        remote_addr: peer,
    };
    let record = store_capture(&state, &session_id, raw, BodyPolicy::Lenient).await?;
    Ok(response::recorded(record))
}

/// Verbs on `/` that need a session identifier.
pub async fn missing_session() -> InspectorError {
    metrics::record_capture_rejected(InspectorError::MissingIdentifier.kind());
    InspectorError::MissingIdentifier
}

async fn store_capture(
    state: &AppState,
    session_id: &str,
    raw: RawRequest<'_>,
    policy: BodyPolicy,
) -> InspectorResult<CapturedRequest> {
    let session_id = require_session(session_id)?;
    let capture = state
        .normalizer
        .normalize(session_id, raw, policy)
        .inspect_err(|e| metrics::record_capture_rejected(e.kind()))?;

    let record = with_store(&state.store, move |store| store.put(capture)).await?;
    tracing::info!(
        session_id = %record.session_id,
        method = %record.method,
        id = record.id,
        "Capture stored"
    );
    metrics::record_capture(&record.method);
    Ok(record)
}

fn require_session(session_id: &str) -> InspectorResult<&str> {
    if session_id.trim().is_empty() {
        metrics::record_capture_rejected(InspectorError::MissingIdentifier.kind());
        return Err(InspectorError::MissingIdentifier);
    }
    Ok(session_id)
}
