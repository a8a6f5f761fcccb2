//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by outcome and status
//! - `gateway_request_duration_seconds` (histogram): end-to-end latency
//!
//! # Design Decisions
//! - Labels carry the outcome taxonomy, so upstream errors, transport
//!   failures, and local rejections are separable in one query
//! - Recording without an installed exporter is a no-op, keeping tests
//!   and embedded use free of listener setup

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!(
                "gateway_requests_total",
                "Total relayed upload requests by outcome and status"
            );
            describe_histogram!(
                "gateway_request_duration_seconds",
                "End-to-end upload handling latency"
            );
            tracing::info!(address = %addr, "Metrics exporter started");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to start metrics exporter");
        }
    }
}

/// Record one handled request.
pub fn record_request(outcome: &'static str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds").record(start.elapsed().as_secs_f64());
}
