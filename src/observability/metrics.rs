//! Metrics collection and exposition.
//!
//! # Metrics
//! - `status_checks_total` (counter): checks by service and resulting status
//! - `status_check_latency_ms` (histogram): latency of answered probes
//! - `status_service_up` (gauge): 1 = last check returned 2xx, 0 otherwise
//! - `status_incidents_total` (counter): incidents by service and new status
//! - `status_poll_cycle_seconds` (histogram): wall time of a full poll cycle
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Duration;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::status::ServiceStatus;

/// Install the Prometheus recorder and serve it on `addr`. Must run inside a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_check(service: &str, status: ServiceStatus, healthy: bool, latency_ms: Option<u64>) {
    counter!(
        "status_checks_total",
        "service" => service.to_string(),
        "status" => status.as_str()
    )
    .increment(1);
    gauge!("status_service_up", "service" => service.to_string()).set(if healthy { 1.0 } else { 0.0 });
    if let Some(ms) = latency_ms {
        histogram!("status_check_latency_ms", "service" => service.to_string()).record(ms as f64);
    }
}

pub fn record_incident(service: &str, new_status: ServiceStatus) {
    counter!(
        "status_incidents_total",
        "service" => service.to_string(),
        "to" => new_status.as_str()
    )
    .increment(1);
}

pub fn record_cycle(duration: Duration) {
    histogram!("status_poll_cycle_seconds").record(duration.as_secs_f64());
}
