//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define server metrics (requests, latency, drive operations)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `lite_requests_total` (counter): total requests by method, status
//! - `lite_request_duration_seconds` (histogram): latency by method
//! - `lite_drive_ops_total` (counter): bridge operations by op, outcome
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Labels kept to small fixed sets; paths are never labels

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Outcome label of a bridge operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    Ok,
    Error,
    Malformed,
}

impl DriveOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
            Self::Malformed => "malformed",
        }
    }
}

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one HTTP request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "lite_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("lite_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record one drive bridge message.
pub fn record_drive_op(op: &'static str, outcome: DriveOutcome) {
    metrics::counter!(
        "lite_drive_ops_total",
        "op" => op,
        "outcome" => outcome.as_str()
    )
    .increment(1);
}
