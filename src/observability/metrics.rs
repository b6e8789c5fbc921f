//! Metrics collection and exposition.
//!
//! # Metrics
//! - `readiness_client_synced` (gauge): 1=synced, 0=not, by kind and target
//! - `readiness_client_sync_progress` (gauge): last reported fraction
//! - `readiness_decisions_total` (counter): pair decisions by outcome
//! - `readiness_waits_total` (counter): finished waits by outcome
//! - `readiness_wait_duration_seconds` (histogram): time spent waiting
//! - `readiness_phase` (gauge): current phase discriminant
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Duration;

use crate::clients::{ClientKind, ClientStatus};
use crate::readiness::decision::{ClientTarget, ReadinessDecision};
use crate::readiness::state::ReadinessPhase;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_client_status(kind: ClientKind, target: ClientTarget, status: &ClientStatus) {
    gauge!(
        "readiness_client_synced",
        "kind" => kind.as_str(),
        "target" => target.as_str()
    )
    .set(if status.is_synced { 1.0 } else { 0.0 });
    if let Some(progress) = status.sync_progress {
        gauge!(
            "readiness_client_sync_progress",
            "kind" => kind.as_str(),
            "target" => target.as_str()
        )
        .set(progress);
    }
}

pub fn record_decision(kind: ClientKind, decision: &ReadinessDecision) {
    counter!(
        "readiness_decisions_total",
        "kind" => kind.as_str(),
        "decision" => decision.label()
    )
    .increment(1);
}

pub fn record_wait(kind: ClientKind, outcome: &'static str, elapsed: Duration) {
    counter!("readiness_waits_total", "kind" => kind.as_str(), "outcome" => outcome).increment(1);
    histogram!("readiness_wait_duration_seconds", "kind" => kind.as_str()).record(elapsed.as_secs_f64());
}

pub fn record_phase(kind: ClientKind, phase: ReadinessPhase) {
    gauge!("readiness_phase", "kind" => kind.as_str()).set(phase as u8 as f64);
}
