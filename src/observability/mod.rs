//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging via tracing; request ID flows through all events
//! - Metrics are cheap (atomic increments); the exporter is optional
//! - The timing filter owns the per-request latency log line; metrics here
//!   cover gateway-level aggregates

pub mod logging;
pub mod metrics;
