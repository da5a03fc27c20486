//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Record request, backend-selection and connection metrics
//! - Expose a Prometheus scrape endpoint when enabled
//!
//! # Metrics
//! - `http_daemon_requests_total` (counter): requests by role, status
//! - `http_daemon_request_duration_seconds` (histogram): time from parsed request to reply written
//! - `http_daemon_backend_selections_total` (counter): proxy picks by host, backend
//! - `http_daemon_active_connections` (gauge): live connection tasks
//!
//! # Design Decisions
//! - Records through the `metrics` facade; without an installed recorder
//!   every call is a no-op
//! - The exporter is installed once per process by the binary

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const REQUESTS_TOTAL: &str = "http_daemon_requests_total";
pub const REQUEST_DURATION: &str = "http_daemon_request_duration_seconds";
pub const BACKEND_SELECTIONS: &str = "http_daemon_backend_selections_total";
pub const ACTIVE_CONNECTIONS: &str = "http_daemon_active_connections";

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from inside a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Count one answered request and its latency.
pub fn record_request(role: &'static str, status: u16, started: Instant) {
    metrics::counter!(REQUESTS_TOTAL, "role" => role, "status" => status.to_string()).increment(1);
    metrics::histogram!(REQUEST_DURATION, "role" => role).record(started.elapsed().as_secs_f64());
}

pub fn record_backend_selection(host: &str, backend: &str) {
    metrics::counter!(
        BACKEND_SELECTIONS,
        "host" => host.to_string(),
        "backend" => backend.to_string()
    )
    .increment(1);
}

pub fn record_active_connections(count: usize) {
    metrics::gauge!(ACTIVE_CONNECTIONS).set(count as f64);
}
