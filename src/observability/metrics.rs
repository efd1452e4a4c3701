//! Metrics collection and exposition.
//!
//! # Metrics
//! - `captures_total` (counter): stored capture events by method
//! - `capture_rejections_total` (counter): rejected captures by reason
//! - `retrievals_total` (counter): history polls served
//! - `proxy_requests_total` (counter): composer relays by outcome
//! - `proxy_request_duration_seconds` (histogram): relay latency
//!
//! # Design Decisions
//! - Recording is a no-op until `init_metrics` installs the exporter
//! - Labels are low-cardinality (never the session id)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_capture(method: &str) {
    metrics::counter!("captures_total", "method" => method.to_string()).increment(1);
}

pub fn record_capture_rejected(reason: &'static str) {
    metrics::counter!("capture_rejections_total", "reason" => reason).increment(1);
}

pub fn record_retrieval(count: usize) {
    metrics::counter!("retrievals_total").increment(1);
    metrics::histogram!("retrieval_size").record(count as f64);
}

pub fn record_proxy(outcome: &'static str, start: Instant) {
    metrics::counter!("proxy_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("proxy_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}
