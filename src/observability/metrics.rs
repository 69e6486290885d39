//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bard_requests_total` (counter): requests by route, status
//! - `bard_request_duration_seconds` (histogram): handling latency by route
//! - `bard_votes_total` (counter): votes by outcome
//! - `bard_reactions_total` (counter): reactions by kind
//! - `bard_active_connections` (gauge): connections being served
//!
//! Recording is a no-op until a recorder is installed, so library users and
//! tests pay nothing when the exporter is off.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and serve it on `addr`. Needs a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one handled request.
pub fn record_request(route: &'static str, status: u16, start: Instant) {
    ::metrics::counter!("bard_requests_total", "route" => route, "status" => status.to_string())
        .increment(1);
    ::metrics::histogram!("bard_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_vote(outcome: &'static str) {
    ::metrics::counter!("bard_votes_total", "outcome" => outcome).increment(1);
}

pub fn record_reaction(kind: &'static str) {
    ::metrics::counter!("bard_reactions_total", "kind" => kind).increment(1);
}

pub fn record_active_connections(count: u64) {
    ::metrics::gauge!("bard_active_connections").set(count as f64);
}
