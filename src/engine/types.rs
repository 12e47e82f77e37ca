//! Engine telemetry types fed into prompts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Operating status reported by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Error,
    Optimizing,
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EngineStatus::Idle => "IDLE",
            EngineStatus::Running => "RUNNING",
            EngineStatus::Paused => "PAUSED",
            EngineStatus::Error => "ERROR",
            EngineStatus::Optimizing => "OPTIMIZING",
        };
        f.write_str(label)
    }
}

/// One telemetry sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineMetric {
    pub timestamp: String,
    pub throughput: f64,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Percent.
    pub efficiency: f64,
    pub load: f64,
}

/// Tunable engine parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub core_frequency: f64,
    pub plasma_density: f64,
    pub coolant_flow: f64,
    pub safety_threshold: f64,
}

/// Everything the advice and analysis prompts need, as exported by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TelemetrySnapshot {
    pub status: EngineStatus,
    pub metrics: Vec<EngineMetric>,
    pub config: EngineConfig,
}

impl TelemetrySnapshot {
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}
