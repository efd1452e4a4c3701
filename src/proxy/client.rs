//! Outbound HTTP client for composer relays.
//!
//! # Responsibilities
//! - Build the real outbound request (method, safe headers, JSON body)
//! - Enforce connect and read timeouts
//! - Normalize the response and classify failures
//!
//! # Design Decisions
//! - Executed once; relays are never retried
//! - Two clients: one verifying TLS, one for HTTPS back to our own host
//!   where local or self-signed certificates are expected

use std::time::Duration;

use axum::http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use url::Url;

use crate::capture::normalizer::collect_headers;
use crate::config::OutboundConfig;
use crate::error::{InspectorError, InspectorResult};
use crate::proxy::envelope::ProxyEnvelope;
use crate::proxy::request::ValidatedRequest;
use crate::security::headers::filter_outbound;

/// reqwest clients used for relays.
#[derive(Clone)]
pub struct OutboundClient {
    verified: reqwest::Client,
    own_host: reqwest::Client,
}

impl OutboundClient {
    pub fn new(config: &OutboundConfig) -> InspectorResult<Self> {
        let build = |accept_invalid_certs: bool| {
            reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
                .read_timeout(Duration::from_secs(config.read_timeout_secs))
                .danger_accept_invalid_certs(accept_invalid_certs)
                .build()
                .map_err(|e| InspectorError::Internal(format!("failed to build HTTP client: {e}")))
        };

        Ok(Self {
            verified: build(false)?,
            own_host: build(true)?,
        })
    }

    /// The client to use for `url`: certificate checks are skipped only
    /// for HTTPS on our own host.
    fn client_for(&self, url: &Url, own_host: bool) -> &reqwest::Client {
        if own_host && url.scheme() == "https" {
            &self.own_host
        } else {
            &self.verified
        }
    }

    /// Perform the relay and normalize the target's answer.
    ///
    /// `own_host` selects the non-verifying client for HTTPS targets on
    /// this service's host.
    pub async fn send(&self, request: &ValidatedRequest, own_host: bool) -> InspectorResult<ProxyEnvelope> {
        let client = self.client_for(&request.url, own_host);

        let mut builder = client.request(request.method.clone(), request.url.clone());
        for (name, value) in filter_outbound(&request.headers) {
            let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
                tracing::debug!(header = %name, "Skipping invalid header name");
                continue;
            };
            for v in value.values() {
                match HeaderValue::from_str(v) {
                    Ok(v) => builder = builder.header(name.clone(), v),
                    Err(_) => tracing::debug!(header = %name, "Skipping invalid header value"),
                }
            }
        }

        if request.sends_body() {
            if let Some(body) = &request.body {
                if request.content_type().is_none() {
                    builder = builder.header(CONTENT_TYPE, "application/json");
                }
                let bytes = serde_json::to_vec(body)
                    .map_err(|e| InspectorError::Internal(format!("failed to encode body: {e}")))?;
                builder = builder.body(bytes);
            }
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let headers = collect_headers(response.headers());
        let bytes = response.bytes().await.map_err(classify)?;

        let data = serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        tracing::debug!(url = %request.url, status = status.as_u16(), "Relay completed");
        Ok(ProxyEnvelope::completed(
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            data,
            headers,
        ))
    }
}

/// Map a reqwest failure onto the error taxonomy.
pub fn classify(err: reqwest::Error) -> InspectorError {
    if err.is_timeout() {
        InspectorError::Timeout
    } else if err.is_connect() || err.is_request() || err.is_body() || err.is_redirect() || err.is_decode() {
        InspectorError::BadGateway(err.to_string())
    } else {
        InspectorError::Internal(err.to_string())
    }
}
