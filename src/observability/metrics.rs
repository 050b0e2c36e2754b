//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ingress_reconcile_total` (counter): rebuilds by outcome
//! - `ingress_reconcile_duration_seconds` (histogram): rebuild latency
//! - `ingress_table_generation` (gauge): generation of the published table
//! - `ingress_table_hosts` / `ingress_table_rules` (gauge): table size
//! - `ingress_rule_conflicts_total` (counter): rules dropped by collisions
//! - `ingress_rules_rejected_total` (counter): invalid rules by reason
//! - `ingress_match_total` (counter): lookups by outcome

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with an HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_reconcile(outcome: &'static str, start: Instant) {
    ::metrics::counter!("ingress_reconcile_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("ingress_reconcile_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_table(generation: u64, hosts: usize, rules: usize) {
    ::metrics::gauge!("ingress_table_generation").set(generation as f64);
    ::metrics::gauge!("ingress_table_hosts").set(hosts as f64);
    ::metrics::gauge!("ingress_table_rules").set(rules as f64);
}

pub fn record_conflict() {
    ::metrics::counter!("ingress_rule_conflicts_total").increment(1);
}

pub fn record_rejected_rule(reason: &'static str) {
    ::metrics::counter!("ingress_rules_rejected_total", "reason" => reason).increment(1);
}

pub fn record_match(matched: bool) {
    let outcome = if matched { "matched" } else { "no_match" };
    ::metrics::counter!("ingress_match_total", "outcome" => outcome).increment(1);
}
