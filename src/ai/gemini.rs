//! Gemini `generateContent` REST client.
//!
//! # Responsibilities
//! - Translate a [`GenerateRequest`] into the REST payload
//! - Surface non-2xx answers as [`AiError::Status`] with Google's error text
//! - Extract answer text and grounding sources from the first candidate
//!
//! Retries and rate-limit handling live in the resilience gate, not here.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::{Host, Url};

use crate::ai::types::{AiError, GenerateRequest, GenerateResponse, GroundingSource};
use crate::ai::GenerativeModel;
use crate::config::AiConfig;

/// Longest error body kept when the response is not Google's error envelope.
const MAX_ERROR_BODY: usize = 512;

/// HTTP client for the Gemini API.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl GeminiClient {
    /// Build a client, reading the API key from `config.api_key_env`.
    ///
    /// A missing key is not an error here; calls report it instead.
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!(env = %config.api_key_env, "No API key found, remote calls will fail");
        }
        Self::with_api_key(config, api_key)
    }

    /// Build a client with an explicit key.
    pub fn with_api_key(config: &AiConfig, api_key: Option<String>) -> Result<Self, AiError> {
        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(config.request_timeout_secs));
        // Local endpoints (emulators, test doubles) never go through a proxy.
        if is_loopback(&config.base_url) {
            builder = builder.no_proxy();
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            api_key_env: config.api_key_env.clone(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

fn is_loopback(base_url: &str) -> bool {
    match Url::parse(base_url).ok().and_then(|url| url.host().map(|h| h.to_owned())) {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key_set", &self.api_key.is_some())
            .finish()
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, AiError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AiError::MissingApiKey(self.api_key_env.clone()))?;

        let url = self.endpoint(&request.model);
        tracing::debug!(model = %request.model, search = request.use_search, "Calling generateContent");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&build_payload(&request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AiError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        parse_response(&body)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Payload<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

fn build_payload(request: &GenerateRequest) -> Payload<'_> {
    let generation_config = if request.temperature.is_some() || request.thinking_budget.is_some() {
        Some(GenerationConfig {
            temperature: request.temperature,
            thinking_config: request
                .thinking_budget
                .map(|thinking_budget| ThinkingConfig { thinking_budget }),
        })
    } else {
        None
    };

    Payload {
        contents: vec![Content {
            role: Some("user"),
            parts: vec![Part {
                text: &request.prompt,
            }],
        }],
        system_instruction: request.system_instruction.as_deref().map(|text| Content {
            role: None,
            parts: vec![Part { text }],
        }),
        generation_config,
        tools: if request.use_search {
            vec![serde_json::json!({ "googleSearch": {} })]
        } else {
            Vec::new()
        },
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WireResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
    thought: bool,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct GroundingMetadata {
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Extract text and grounding sources from a successful response body.
fn parse_response(body: &str) -> Result<GenerateResponse, AiError> {
    let wire: WireResponse =
        serde_json::from_str(body).map_err(|e| AiError::Decode(e.to_string()))?;

    let Some(candidate) = wire.candidates.into_iter().next() else {
        return Ok(GenerateResponse::default());
    };

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    let sources = candidate
        .grounding_metadata
        .map(|metadata| {
            metadata
                .grounding_chunks
                .into_iter()
                .filter_map(|chunk| chunk.web)
                .filter_map(|web| match web.uri {
                    Some(uri) if !uri.is_empty() => Some(GroundingSource {
                        uri,
                        title: web.title.unwrap_or_default(),
                    }),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(GenerateResponse {
        text: (!text.is_empty()).then_some(text),
        sources,
    })
}

/// Human-readable text for a non-2xx body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => match error.status {
            Some(status) => format!("{}: {}", status, error.message),
            None => error.message,
        },
        Err(_) => body.chars().take(MAX_ERROR_BODY).collect(),
    }
}
