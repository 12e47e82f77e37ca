//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! resilience gate and neural services produce:
//!     → logging.rs (structured tracing events, one span per guarded call)
//!     → metrics.rs (outcome counters, trips, backoff histogram)
//!
//! Consumers:
//!     → stderr (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
