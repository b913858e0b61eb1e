//! Text-generation collaborators.
//!
//! The chat handler only depends on [`Generator`]; [`GeminiGenerator`] is the
//! production implementation.

mod gemini;

pub use gemini::GeminiGenerator;

use async_trait::async_trait;

/// A service that turns one prompt string into generated text.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &str;

    /// Model used for generation.
    fn model(&self) -> &str;

    /// Generate a completion for `prompt`.
    ///
    /// `Ok` with an empty string means the service answered but produced no text.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Error from a generation provider.
#[derive(Debug, Clone, thiserror::Error)]
#[error("[{provider}:{model}] {message}")]
pub struct GenerationError {
    pub provider: String,
    pub model: String,
    pub message: String,
    pub status_code: Option<u16>,
}

impl GenerationError {
    pub fn new(provider: &str, model: &str, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            message: message.into(),
            status_code: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }
}
