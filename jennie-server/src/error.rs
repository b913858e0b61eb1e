//! Error types for the chat API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Message returned for upstream failures outside development mode.
pub const GENERIC_UPSTREAM_MESSAGE: &str = "Failed to process your request";

/// Chat API errors.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The client sent an unusable request.
    #[error("{0}")]
    Validation(String),

    /// The server is missing required configuration.
    #[error("{0}")]
    Configuration(String),

    /// The generation service failed.
    #[error("{0}")]
    Upstream(String),
}

impl ChatError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ChatError::Validation(_) => StatusCode::BAD_REQUEST,
            ChatError::Configuration(_) | ChatError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let body = serde_json::json!({
            "detail": message,
            "error": message,
        });

        (self.status_code(), axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChatError::Validation("Message is required".to_string());
        assert_eq!(err.to_string(), "Message is required");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ChatError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ChatError::Configuration("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ChatError::Upstream("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_into_response_body() {
        let response = ChatError::Upstream(GENERIC_UPSTREAM_MESSAGE.into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], GENERIC_UPSTREAM_MESSAGE);
        assert_eq!(json["error"], GENERIC_UPSTREAM_MESSAGE);
    }
}
