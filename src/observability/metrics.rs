//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): relayed requests by method, status
//! - `relay_request_duration_seconds` (histogram): relay latency
//! - `relay_failures_total` (counter): upstream/transport failures
//! - `relay_origin_rejections_total` (counter): requests stopped by the gate

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
///
/// Exporter failure is logged, not fatal: the relay serves traffic without
/// metrics rather than refusing to start.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(error) => tracing::error!(%error, "Failed to install metrics exporter"),
    }
}

/// Record one completed relay exchange.
pub fn record_relay(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    metrics::counter!(
        "relay_requests_total",
        "method" => method.clone(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "relay_request_duration_seconds",
        "method" => method,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a relay failure surfaced to the caller.
pub fn record_relay_failure() {
    metrics::counter!("relay_failures_total").increment(1);
}

/// Record a request rejected by the origin gate.
pub fn record_origin_rejection() {
    metrics::counter!("relay_origin_rejections_total").increment(1);
}
