//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML, and every
//! section falls back to defaults so an empty file is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::resilience::backoff::{
    RetryPolicy, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS,
};
use crate::resilience::circuit_breaker::DEFAULT_COOLDOWN;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct NeuralConfig {
    /// Retry and circuit breaker settings.
    pub gate: GateConfig,

    /// Generative endpoint settings.
    pub ai: AiConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Retry policy and circuit cooldown for the remote call gate.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GateConfig {
    /// Total attempts per call, including the first.
    pub max_attempts: u32,

    /// Backoff after the first rate-limited attempt, in milliseconds.
    pub base_delay_ms: u64,

    /// Backoff growth per further attempt.
    pub backoff_multiplier: f64,

    /// How long the circuit stays open after a rate-limit signal.
    pub cooldown_ms: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            cooldown_ms: DEFAULT_COOLDOWN.as_millis() as u64,
        }
    }
}

impl GateConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.base_delay_ms, self.backoff_multiplier)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Generative-AI endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AiConfig {
    /// Base URL of the API (scheme and host, optional path prefix).
    pub base_url: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Model for chat and short advice.
    pub fast_model: String,

    /// Model for chart generation and deep analysis.
    pub deep_model: String,

    pub chart_temperature: f32,

    pub advice_temperature: f32,

    /// Thinking token budget for deep analysis.
    pub analysis_thinking_budget: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key_env: "API_KEY".to_string(),
            request_timeout_secs: 60,
            fast_model: "gemini-3-flash-preview".to_string(),
            deep_model: "gemini-3-pro-preview".to_string(),
            chart_temperature: 0.7,
            advice_temperature: 0.4,
            analysis_thinking_budget: 16_000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "neural_core=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
