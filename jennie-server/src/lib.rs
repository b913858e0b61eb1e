//! jennie-server - Chat relay to Gemini with short-lived per-session context.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod error;
pub mod prompt;
pub mod provider;
pub mod routes;
pub mod session;

pub use error::ChatError;
pub use prompt::build_prompt;
pub use provider::{GeminiGenerator, GenerationError, Generator};
pub use routes::{build_router, AppState, ChatRequest, ChatResponse, FALLBACK_REPLY};
pub use session::{ConversationLog, Role, SessionStore, Turn};
