//! Metrics collection and exposition.
//!
//! # Metrics
//! - `certchain_connect_attempts_total` (counter): connect sequences started
//! - `certchain_connect_failures_total` (counter): failed sequences by step
//! - `certchain_network_mismatch_total` (counter): wrong-network checks
//! - `certchain_wallet_events_total` (counter): pushed wallet events by kind
//! - `certchain_session_connected` (gauge): 1=connected, 0=not
//! - `certchain_reloads_total` (counter): application restarts by reason
//!
//! Recording is a no-op until an exporter is installed.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Install the Prometheus exporter with an HTTP listener on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_connect_attempt() {
    metrics::counter!("certchain_connect_attempts_total").increment(1);
}

pub fn record_connect_failure(step: &'static str) {
    metrics::counter!("certchain_connect_failures_total", "step" => step).increment(1);
}

pub fn record_network_mismatch() {
    metrics::counter!("certchain_network_mismatch_total").increment(1);
}

pub fn record_wallet_event(kind: &'static str) {
    metrics::counter!("certchain_wallet_events_total", "kind" => kind).increment(1);
}

pub fn set_session_connected(connected: bool) {
    metrics::gauge!("certchain_session_connected").set(if connected { 1.0 } else { 0.0 });
}

pub fn record_reload(reason: &'static str) {
    metrics::counter!("certchain_reloads_total", "reason" => reason).increment(1);
}
