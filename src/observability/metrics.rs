//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_requests_total` (counter): requests by method, status, target
//! - `edge_request_duration_seconds` (histogram): latency distribution
//! - `edge_active_connections` (gauge): current connection count
//! - `edge_host_rejections_total` (counter): connections dropped by the host gate
//! - `edge_body_rejections_total` (counter): uploads refused by the size ceiling
//! - `edge_upstream_failures_total` (counter): failed hops to the application
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations under the hood)
//! - The Prometheus exporter runs its own listener, separate from traffic

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
///
/// Failure to bind the exporter is logged and tolerated; the edge keeps
/// serving without metrics rather than refusing to start.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed request.
pub fn record_request(method: &str, status: u16, target: &'static str, start: Instant) {
    metrics::counter!(
        "edge_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "target" => target,
    )
    .increment(1);
    metrics::histogram!("edge_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn connection_opened() {
    metrics::gauge!("edge_active_connections").increment(1.0);
}

pub fn connection_closed() {
    metrics::gauge!("edge_active_connections").decrement(1.0);
}

pub fn record_host_rejection() {
    metrics::counter!("edge_host_rejections_total").increment(1);
}

pub fn record_body_rejection() {
    metrics::counter!("edge_body_rejections_total").increment(1);
}

pub fn record_upstream_failure() {
    metrics::counter!("edge_upstream_failures_total").increment(1);
}
