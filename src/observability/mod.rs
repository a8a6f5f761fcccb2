//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, request IDs attached)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging via tracing; level from config, RUST_LOG wins
//! - Metric updates are cheap (atomic increments); recording is a no-op
//!   until an exporter is installed, so tests skip it entirely

pub mod logging;
pub mod metrics;
