//! Handler for `POST /proxy` (and `/api/proxy`).

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Uri};
use axum::response::IntoResponse;
use axum::Json;

use crate::capture::normalizer::client_ip;
use crate::http::request::PeerAddr;
use crate::http::server::AppState;
use crate::proxy::RelayOrigin;

pub async fn relay(
    State(state): State<AppState>,
    PeerAddr(peer): PeerAddr,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.to_string()));
    let origin = RelayOrigin {
        host,
        client_ip: client_ip(&headers, peer, state.normalizer.trusts_forwarded_for()),
    };

    let (status, envelope) = state.proxy.relay(origin, &body).await;
    (status, Json(envelope))
}
