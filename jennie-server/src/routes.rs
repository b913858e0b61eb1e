//! HTTP API routes.

use crate::error::{ChatError, GENERIC_UPSTREAM_MESSAGE};
use crate::prompt::build_prompt;
use crate::provider::{GeminiGenerator, Generator};
use crate::session::{SessionStore, CONTEXT_TURNS, DEFAULT_SESSION_ID};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use jennie_common::config::Config;
use jennie_common::logging::generate_trace_id;
use jennie_common::request_span;
use jennie_common::util::{sanitize_for_log, truncate_with_ellipsis};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::Instrument;

/// Reply stored and returned when the generator answers with no text.
pub const FALLBACK_REPLY: &str = "I couldn't generate a response at this moment. Please try again.";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub store: SessionStore,
    /// `None` when no credential is configured; chat then fails with a configuration error.
    pub generator: Option<Arc<dyn Generator>>,
    /// Echo raw upstream errors to clients.
    pub dev_mode: bool,
}

impl AppState {
    pub fn new(generator: Option<Arc<dyn Generator>>, dev_mode: bool) -> Self {
        Self {
            store: SessionStore::new(),
            generator,
            dev_mode,
        }
    }

    /// Build state from configuration, wiring Gemini when a credential is present.
    pub fn from_config(config: &Config) -> Self {
        let generator = config.gemini_api_key().map(|key| {
            Arc::new(GeminiGenerator::new(key, &config.gemini)) as Arc<dyn Generator>
        });
        Self::new(generator, config.dev_mode)
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/chat", post(chat))
        .route("/api/chat/history/:session_id", delete(clear_history))
        .with_state(state)
}

// ============ Health Check ============

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "Server is running",
        "api": "Gemini"
    }))
}

// ============ Chat ============

/// Inbound chat message.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Chat reply.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected chat body");
        ChatError::Validation(rejection.body_text())
    })?;

    let message = request
        .message
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ChatError::Validation("Message is required".into()))?;

    let generator = state
        .generator
        .clone()
        .ok_or_else(|| ChatError::Configuration("Gemini API key is not configured".into()))?;

    let session_id = request
        .session_id
        .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string());

    let trace_id = generate_trace_id();
    let span = request_span!("chat", trace_id, session_id = %session_id);

    exchange(&state, generator.as_ref(), session_id, message)
        .instrument(span)
        .await
        .map(Json)
}

/// Run one exchange: snapshot context, generate, then record both turns.
///
/// The session lock is released while the generator is in flight.
async fn exchange(
    state: &AppState,
    generator: &dyn Generator,
    session_id: String,
    message: String,
) -> Result<ChatResponse, ChatError> {
    let log = state.store.get_or_create(&session_id).await;
    let context = log.lock().await.recent(CONTEXT_TURNS);
    let prompt = build_prompt(&context, &message);

    tracing::debug!(
        provider = generator.name(),
        model = generator.model(),
        context_turns = context.len(),
        message = %truncate_with_ellipsis(&message, 80),
        "Generating reply"
    );

    let reply = match generator.generate(&prompt).await {
        Ok(text) if text.is_empty() => {
            tracing::warn!("Generator returned no text, using fallback reply");
            FALLBACK_REPLY.to_string()
        }
        Ok(text) => text,
        Err(e) => {
            tracing::error!(
                error = %sanitize_for_log(&e.to_string()),
                status = ?e.status_code,
                "Generation failed"
            );
            let detail = if state.dev_mode {
                e.to_string()
            } else {
                GENERIC_UPSTREAM_MESSAGE.to_string()
            };
            return Err(ChatError::Upstream(detail));
        }
    };

    let history_len = {
        let mut log = log.lock().await;
        log.push_exchange(message.as_str(), reply.as_str());
        log.len()
    };

    tracing::info!(history_len, "Response sent");

    Ok(ChatResponse { reply, session_id })
}

// ============ History ============

async fn clear_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let existed = state.store.delete(&session_id).await;
    tracing::info!(session_id = %session_id, existed, "Conversation history cleared");

    Json(serde_json::json!({
        "message": "Conversation history cleared"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_defaults() {
        let request: ChatRequest = serde_json::from_str(r#"{"message": "Hi"}"#).unwrap();
        assert_eq!(request.message.as_deref(), Some("Hi"));
        assert!(request.session_id.is_none());

        let request: ChatRequest =
            serde_json::from_str(r#"{"message": "Hi", "sessionId": null}"#).unwrap();
        assert!(request.session_id.is_none());

        let request: ChatRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(request.message.is_none());
    }

    #[test]
    fn test_chat_response_wire_names() {
        let response = ChatResponse {
            reply: "Hello!".into(),
            session_id: "s1".into(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({"reply": "Hello!", "sessionId": "s1"}));
    }

    #[test]
    fn test_state_without_key_has_no_generator() {
        let state = AppState::from_config(&Config::default());
        assert!(state.generator.is_none());
        assert!(!state.dev_mode);
    }

    #[test]
    fn test_state_with_key_uses_gemini() {
        let mut config = Config::default();
        config.gemini.api_key = Some("key".into());
        let state = AppState::from_config(&config);
        let generator = state.generator.unwrap();
        assert_eq!(generator.name(), "gemini");
        assert_eq!(generator.model(), "gemini-2.5-flash");
    }
}
