//! Request, response and error types for generative endpoints.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One generation request: a prompt plus per-call options.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub temperature: Option<f32>,
    pub thinking_budget: Option<u32>,
    /// Ground the answer with web search.
    pub use_search: bool,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn thinking_budget(mut self, budget: u32) -> Self {
        self.thinking_budget = Some(budget);
        self
    }

    pub fn with_search(mut self, use_search: bool) -> Self {
        self.use_search = use_search;
        self
    }
}

/// A web source the answer was grounded on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    pub title: String,
}

/// Generated output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerateResponse {
    /// Concatenated answer text; `None` when the model produced none.
    pub text: Option<String>,
    pub sources: Vec<GroundingSource>,
}

impl GenerateResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            sources: Vec::new(),
        }
    }

    /// The answer text, or `fallback` when empty.
    pub fn text_or(&self, fallback: &str) -> String {
        match self.text.as_deref() {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// Errors from a generative endpoint.
///
/// Display output starts with the HTTP status for non-2xx answers so the
/// gate's text classifier recognises 429s.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("API key not configured: set the {0} environment variable")]
    MissingApiKey(String),

    #[error("{status}: {message}")]
    Status { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl AiError {
    /// HTTP status of the failed call, if it got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            AiError::Status { status, .. } => Some(*status),
            AiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
