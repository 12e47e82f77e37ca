//! Generative-AI endpoint abstraction.
//!
//! The resilience gate treats the endpoint as an opaque
//! `(prompt, options) → response | error` function; [`GenerativeModel`] is that
//! seam. [`GeminiClient`] is the HTTP implementation.

pub mod gemini;
pub mod types;

use async_trait::async_trait;

pub use gemini::GeminiClient;
pub use types::{AiError, GenerateRequest, GenerateResponse, GroundingSource};

/// A remote model that turns a prompt into text.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, AiError>;
}
