//! Engine telemetry model.
//!
//! Only the shapes are defined here; generating simulated values is the
//! dashboard's business.

pub mod types;

pub use types::{EngineConfig, EngineMetric, EngineStatus, TelemetrySnapshot};
