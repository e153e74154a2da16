use std::time::Duration;

use exercise_agent_core::{GenerationError, RecommendationGenerator};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AgentConfig;

/// Provider body excerpts kept in error messages (they end up in logs only).
const ERROR_BODY_MAX_CHARS: usize = 300;

#[derive(Debug, Error)]
pub enum GeminiInitError {
    #[error("GEMINI_API_KEY not found in environment variables")]
    MissingApiKey,
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Gemini `generateContent` client. Built once at startup, never mutated.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiClient {
    pub fn from_config(config: &AgentConfig) -> Result<Self, GeminiInitError> {
        let api_key = config
            .gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(GeminiInitError::MissingApiKey)?;

        // Must stay above the dispatcher timeout, which fires first.
        let http = reqwest::Client::builder()
            .timeout(
                config
                    .generation_timeout()
                    .saturating_add(Duration::from_secs(1)),
            )
            .build()?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            endpoint: generate_content_url(&config.gemini_api_url, &config.gemini_model),
            model: config.gemini_model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl RecommendationGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = GenerateContentRequest {
            contents: [Content {
                parts: [RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| GenerationError::Provider(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::ProviderStatus {
                status: status.as_u16(),
                body: truncate_chars(&body, ERROR_BODY_MAX_CHARS),
            });
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| GenerationError::Provider(format!("malformed response: {err}")))?;

        collect_text(&payload).ok_or(GenerationError::EmptyResponse)
    }
}

fn generate_content_url(api_url: &str, model: &str) -> String {
    let model = model.trim().trim_start_matches("models/");
    format!(
        "{}/v1beta/models/{model}:generateContent",
        api_url.trim().trim_end_matches('/')
    )
}

/// Concatenate the text parts of the first candidate.
fn collect_text(payload: &GenerateContentResponse) -> Option<String> {
    let parts = &payload.candidates.first()?.content.as_ref()?.parts;
    let text: String = parts.iter().filter_map(|part| part.text.as_deref()).collect();
    (!text.trim().is_empty()).then_some(text)
}

fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &value[..idx]),
        None => value.to_string(),
    }
}
