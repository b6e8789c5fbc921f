//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Probes, pair decisions, waits
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (gauges, counters, histograms)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Prometheus scrape endpoint
//! ```

pub mod logging;
pub mod metrics;
