//! Outbound proxy subsystem.
//!
//! # Data Flow
//! ```text
//! POST /proxy {url, method, headers, body}
//!     → request.rs (parse, validate URL and method)
//!     → target.rs (own host + /{uuid} path?)
//!         yes → self-request shortcut: write straight to the capture store
//!         no  → client.rs (real outbound call, timeouts, classification)
//!     → envelope.rs ({success, status, statusText, data, headers, timestamp})
//! ```
//!
//! # Design Decisions
//! - Self-requests never touch the network
//! - Network failures become a failure envelope, never a raw error
//! - One attempt per relay

pub mod client;
pub mod envelope;
pub mod request;
pub mod target;

use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use serde_json::json;

use crate::capture::{HeaderBag, HeaderValue, NewCapture, QueryParams};
use crate::config::OutboundConfig;
use crate::error::InspectorResult;
use crate::observability::metrics;
use crate::security::headers::filter_outbound;
use crate::store::{with_store, CaptureStore};

pub use client::OutboundClient;
pub use envelope::ProxyEnvelope;
pub use request::{parse_composer_request, ValidatedRequest};
pub use target::SelfTargetMatcher;

/// Facts about the inbound `/proxy` call itself.
#[derive(Debug, Clone, Default)]
pub struct RelayOrigin {
    /// `Host` header of the `/proxy` request.
    pub host: Option<String>,
    /// Client IP of the dashboard.
    pub client_ip: Option<String>,
}

/// Relays composer requests, short-circuiting calls to our own capture endpoint.
#[derive(Clone)]
pub struct OutboundProxy {
    client: OutboundClient,
    store: Arc<dyn CaptureStore>,
    matcher: SelfTargetMatcher,
    self_user_agent: String,
}

impl OutboundProxy {
    pub fn new(config: &OutboundConfig, store: Arc<dyn CaptureStore>) -> InspectorResult<Self> {
        Ok(Self {
            client: OutboundClient::new(config)?,
            store,
            matcher: SelfTargetMatcher::new(config.public_url.as_deref()),
            self_user_agent: config.self_user_agent.clone(),
        })
    }

    /// Handle a raw `/proxy` body.
    ///
    /// Returns the HTTP status for the `/proxy` response together with
    /// the envelope; errors are folded into failure envelopes.
    pub async fn relay(&self, origin: RelayOrigin, body: &[u8]) -> (StatusCode, ProxyEnvelope) {
        let start = Instant::now();
        match self.try_relay(&origin, body).await {
            Ok((outcome, envelope)) => {
                metrics::record_proxy(outcome, start);
                (StatusCode::OK, envelope)
            }
            Err(err) => {
                tracing::warn!(error = %err, kind = err.kind(), "Relay failed");
                metrics::record_proxy(err.kind(), start);
                (err.status(), ProxyEnvelope::failed(err.to_string()))
            }
        }
    }

    async fn try_relay(
        &self,
        origin: &RelayOrigin,
        body: &[u8],
    ) -> InspectorResult<(&'static str, ProxyEnvelope)> {
        let request = parse_composer_request(body)?;
        let host = origin.host.as_deref();

        if let Some(session_id) = self.matcher.capture_session(&request.url, host) {
            tracing::info!(session_id = %session_id, method = %request.method, "Self-request short-circuited");
            let envelope = self.capture_locally(session_id, &request, origin).await?;
            return Ok(("self_request", envelope));
        }

        let own_host = self.matcher.is_own_host(&request.url, host);
        tracing::info!(url = %request.url, method = %request.method, own_host, "Relaying request");
        let envelope = self.client.send(&request, own_host).await?;
        Ok(("completed", envelope))
    }

    /// Store the composer's request directly and answer as the capture
    /// endpoint would have for a POST.
    async fn capture_locally(
        &self,
        session_id: String,
        request: &ValidatedRequest,
        origin: &RelayOrigin,
    ) -> InspectorResult<ProxyEnvelope> {
        let capture = self_capture(session_id, request, origin, &self.self_user_agent);
        let record = with_store(&self.store, move |store| store.put(capture)).await?;
        metrics::record_capture(&record.method);

        let mut headers = HeaderBag::new();
        headers.insert(
            "content-type".to_string(),
            HeaderValue::Single("application/json; charset=utf-8".to_string()),
        );
        Ok(ProxyEnvelope::completed(
            StatusCode::CREATED.as_u16(),
            "Created",
            json!({ "success": true, "payload": record }),
            headers,
        ))
    }
}

/// Build the capture a real call to our endpoint would have produced.
pub fn self_capture(
    session_id: String,
    request: &ValidatedRequest,
    origin: &RelayOrigin,
    user_agent: &str,
) -> NewCapture {
    let mut headers = filter_outbound(&request.headers);
    headers.insert(
        "user-agent".to_string(),
        HeaderValue::Single(user_agent.to_string()),
    );
    let content_type = request
        .content_type()
        .map(str::to_string)
        .unwrap_or_else(|| "application/json".to_string());
    headers
        .entry("content-type".to_string())
        .or_insert_with(|| HeaderValue::Single(content_type.clone()));

    let query_params: QueryParams = request.url.query_pairs().into_owned().collect();

    NewCapture {
        session_id,
        method: request.method.as_str().to_string(),
        body: request.body.clone(),
        headers,
        query_params,
        ip_address: origin.client_ip.clone(),
        user_agent: Some(user_agent.to_string()),
        content_type: Some(content_type),
    }
}
