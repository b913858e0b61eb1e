//! Google Gemini generator.
//!
//! Calls `generateContent` with the whole prompt as a single user part. The
//! API key travels in the `x-goog-api-key` header so it never appears in
//! request URLs or transport error messages.

use super::{GenerationError, Generator};
use async_trait::async_trait;
use jennie_common::config::GeminiConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const PROVIDER: &str = "gemini";

/// Gemini generator bound to one model and credential.
pub struct GeminiGenerator {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

// ══════════════════════════════════════════════════════════════════════════════
// API REQUEST/RESPONSE TYPES
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

impl GeminiGenerator {
    /// Create a generator from configuration and a resolved credential.
    pub fn new(api_key: impl Into<String>, config: &GeminiConfig) -> Self {
        Self {
            api_key: api_key.into(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn endpoint(&self) -> String {
        let model_name = if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        };
        format!("{}/v1beta/{model_name}:generateContent", self.base_url)
    }

    fn error(&self, message: impl Into<String>) -> GenerationError {
        GenerationError::new(PROVIDER, &self.model, message)
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let start = Instant::now();

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.error(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(self
                .error(format!("API error ({}): {}", status.as_u16(), error_text))
                .with_status(status.as_u16()));
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| self.error(format!("Failed to parse response: {e}")))?;

        if let Some(err) = result.error {
            return Err(self.error(format!("API error: {}", err.message)));
        }

        let candidate = result
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| {
                let reason = result
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .unwrap_or_else(|| "no candidates".into());
                self.error(format!("No response from Gemini ({reason})"))
            })?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        tracing::debug!(
            model = %self.model,
            finish_reason = ?candidate.finish_reason,
            chars = text.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Gemini generation completed"
        );

        Ok(text)
    }
}
