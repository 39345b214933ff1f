//! Metrics collection and exposition.
//!
//! # Metrics
//! - `turnstile_admission_total` (counter): admission checks by outcome
//!   (admitted, rejected, error)
//! - `turnstile_forwarded_total` (counter): upstream forwards by status
//! - `turnstile_tracked_clients` (gauge): registry size after each sweep

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to start metrics endpoint"),
    }
}

/// Record one admission check outcome.
pub fn record_admission(outcome: &'static str) {
    counter!("turnstile_admission_total", "outcome" => outcome).increment(1);
}

/// Record one forwarded request by upstream status code.
pub fn record_forwarded(status: u16) {
    counter!("turnstile_forwarded_total", "status" => status.to_string()).increment(1);
}

/// Publish the number of clients currently tracked by the registry.
pub fn record_tracked_clients(count: usize) {
    gauge!("turnstile_tracked_clients").set(count as f64);
}
