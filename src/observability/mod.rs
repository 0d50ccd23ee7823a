//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via `tracing`, with a per-request `TraceLayer` span
//!   and propagated request IDs
//! - Metrics are cheap counter/histogram updates; the Prometheus exporter is
//!   optional and listens on its own port

pub mod logging;
pub mod metrics;
