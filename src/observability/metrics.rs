//! Metrics collection and exposition.
//!
//! # Metrics
//! - `fts_requests_total` (counter): calls by endpoint key and outcome
//! - `fts_rate_limited_total` (counter): local denials by endpoint key
//! - `fts_cache_hits_total` / `fts_cache_misses_total` (counters)
//! - `fts_payment_verifications_total` (counter): by outcome
//!
//! Recording goes through the `metrics` facade and is a no-op until an
//! exporter is installed, so the client library costs nothing when the
//! embedder does not care.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
///
/// Failure to bind is logged, not fatal: the service degrades to
/// unobserved rather than refusing to start.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(endpoint: &str, outcome: &'static str) {
    counter!(
        "fts_requests_total",
        "endpoint" => endpoint.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_rate_limited(endpoint: &str) {
    counter!("fts_rate_limited_total", "endpoint" => endpoint.to_string()).increment(1);
}

pub fn record_cache_hit() {
    counter!("fts_cache_hits_total").increment(1);
}

pub fn record_cache_miss() {
    counter!("fts_cache_misses_total").increment(1);
}

pub fn record_payment_verification(outcome: &'static str) {
    counter!("fts_payment_verifications_total", "outcome" => outcome).increment(1);
}
