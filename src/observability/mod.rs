//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via tracing; level from config or `RUST_LOG`
//! - Metrics are cheap counters behind the `metrics` facade; the Prometheus
//!   exporter is only installed by the payment service binary

pub mod logging;
pub mod metrics;
