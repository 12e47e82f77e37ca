//! Metrics collection and exposition.
//!
//! # Metrics
//! - `neural_gate_calls_total` (counter): guarded calls by outcome
//! - `neural_gate_retries_total` (counter): backoff retries scheduled
//! - `neural_gate_backoff_seconds` (histogram): backoff delays
//! - `neural_gate_circuit_trips_total` (counter): trips by circuit
//! - `neural_gate_circuit_rejections_total` (counter): fast-fails by circuit
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_gate_outcome(outcome: &'static str) {
    counter!("neural_gate_calls_total", "outcome" => outcome).increment(1);
}

pub fn record_retry(delay: Duration) {
    counter!("neural_gate_retries_total").increment(1);
    histogram!("neural_gate_backoff_seconds").record(delay.as_secs_f64());
}

pub fn record_circuit_trip(circuit: &str) {
    counter!("neural_gate_circuit_trips_total", "circuit" => circuit.to_string()).increment(1);
}

pub fn record_circuit_rejection(circuit: &str) {
    counter!("neural_gate_circuit_rejections_total", "circuit" => circuit.to_string()).increment(1);
}
