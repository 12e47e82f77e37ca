//! Neural core services: the prompt-building callers of the gate.
//!
//! # Responsibilities
//! - Build one prompt per concern (chart config, advice, chat, deep analysis)
//! - Send it through the shared [`Gate`] so every service honours the same circuit
//! - Replace any gate failure with a static message; raw errors only reach the logs

pub mod chart;
pub mod prompts;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::ai::{AiError, GenerateRequest, GenerateResponse, GenerativeModel, GroundingSource};
use crate::config::{AiConfig, NeuralConfig};
use crate::engine::{EngineConfig, EngineMetric, EngineStatus};
use crate::lifecycle::CancelToken;
use crate::resilience::{CircuitBreaker, Gate, GateError};

/// Model names and sampling settings per service.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub fast_model: String,
    pub deep_model: String,
    pub chart_temperature: f32,
    pub advice_temperature: f32,
    pub analysis_thinking_budget: u32,
}

impl From<&AiConfig> for ModelSettings {
    fn from(config: &AiConfig) -> Self {
        Self {
            fast_model: config.fast_model.clone(),
            deep_model: config.deep_model.clone(),
            chart_temperature: config.chart_temperature,
            advice_temperature: config.advice_temperature,
            analysis_thinking_budget: config.analysis_thinking_budget,
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self::from(&AiConfig::default())
    }
}

/// Answer to a chart request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartReply {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

/// Answer to a chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<GroundingSource>,
}

/// Facade over the generative model, guarded by a shared gate.
#[derive(Clone)]
pub struct NeuralCore {
    model: Arc<dyn GenerativeModel>,
    gate: Gate,
    settings: ModelSettings,
    cancel: CancelToken,
}

impl NeuralCore {
    pub fn new(model: Arc<dyn GenerativeModel>, gate: Gate, settings: ModelSettings) -> Self {
        Self {
            model,
            gate,
            settings,
            cancel: CancelToken::never(),
        }
    }

    /// Wire a core from configuration around an existing circuit.
    pub fn from_config(
        model: Arc<dyn GenerativeModel>,
        circuit: Arc<CircuitBreaker>,
        config: &NeuralConfig,
    ) -> Self {
        let gate = Gate::new(circuit, config.gate.retry_policy());
        Self::new(model, gate, ModelSettings::from(&config.ai))
    }

    /// Abandon in-flight calls when `cancel` fires.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, GateError<AiError>> {
        self.gate
            .call_with_cancel(&self.cancel, || {
                let model = Arc::clone(&self.model);
                let request = request.clone();
                async move { model.generate(request).await }
            })
            .await
    }

    /// Generate a Highcharts config from a natural-language prompt.
    pub async fn generate_chart_config(&self, prompt: &str) -> ChartReply {
        let request = GenerateRequest::new(&self.settings.deep_model, prompt)
            .system_instruction(prompts::CHART_SYSTEM_INSTRUCTION)
            .temperature(self.settings.chart_temperature);

        match self.generate(request).await {
            Ok(response) => {
                let text = response.text_or(prompts::NO_RESPONSE);
                let config = chart::parse_chart_config(&text);
                ChartReply { text, config }
            }
            Err(e) => {
                tracing::error!(kind = e.kind(), error = %e, "Chart generation failed");
                ChartReply {
                    text: prompts::CHART_FAILED.to_string(),
                    config: None,
                }
            }
        }
    }

    /// One-sentence engineering advice for the latest telemetry sample.
    pub async fn engine_advice(
        &self,
        metrics: &[EngineMetric],
        _config: &EngineConfig,
        status: EngineStatus,
    ) -> String {
        if self.gate.circuit().admit().is_err() {
            return prompts::COOLING_DOWN.to_string();
        }
        let Some(latest) = metrics.last() else {
            return prompts::NO_TELEMETRY.to_string();
        };

        let request = GenerateRequest::new(
            &self.settings.fast_model,
            prompts::advice_prompt(status, latest),
        )
        .temperature(self.settings.advice_temperature);

        match self.generate(request).await {
            Ok(response) => response.text_or(prompts::ADVICE_EMPTY),
            Err(e) => {
                tracing::warn!(kind = e.kind(), error = %e, "Engine advice failed");
                prompts::ADVICE_FAILED.to_string()
            }
        }
    }

    /// Free-form chat, optionally grounded with web search.
    pub async fn chat(&self, message: &str, use_search: bool) -> ChatReply {
        let request = GenerateRequest::new(&self.settings.fast_model, message)
            .system_instruction(prompts::CHAT_SYSTEM_INSTRUCTION)
            .with_search(use_search);

        match self.generate(request).await {
            Ok(response) => ChatReply {
                text: response.text_or(prompts::NO_RESPONSE),
                sources: response.sources,
            },
            Err(e) => {
                tracing::warn!(kind = e.kind(), error = %e, "Chat failed");
                ChatReply {
                    text: prompts::CHAT_FAILED.to_string(),
                    sources: Vec::new(),
                }
            }
        }
    }

    /// Three-step technical plan from the recent metrics and current config.
    pub async fn deep_analysis(&self, metrics: &[EngineMetric], config: &EngineConfig) -> String {
        let window = prompts::analysis_window(metrics);
        let serialized = serde_json::to_string(window)
            .and_then(|m| serde_json::to_string(config).map(|c| (m, c)));
        let (metrics_json, config_json) = match serialized {
            Ok(parts) => parts,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize telemetry for analysis");
                return prompts::ANALYSIS_FAILED.to_string();
            }
        };

        let request = GenerateRequest::new(
            &self.settings.deep_model,
            prompts::analysis_prompt(&metrics_json, &config_json),
        )
        .thinking_budget(self.settings.analysis_thinking_budget);

        match self.generate(request).await {
            Ok(response) => response.text_or(prompts::ANALYSIS_EMPTY),
            Err(e) => {
                tracing::warn!(kind = e.kind(), error = %e, "Deep analysis failed");
                prompts::ANALYSIS_FAILED.to_string()
            }
        }
    }
}

impl std::fmt::Debug for NeuralCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeuralCore")
            .field("gate", &self.gate)
            .field("settings", &self.settings)
            .finish()
    }
}
