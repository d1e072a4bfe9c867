//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use simplechat_types::error::ChatError;

use super::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Failure of a chat turn or a missing session.
    Chat(ChatError),

    /// A chat request body that could not be read.
    UnreadableBody(String),

    /// A chat request body in a format other than form data.
    UnsupportedMediaType(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Chat(ChatError::InvalidSession) => (
                StatusCode::BAD_REQUEST,
                "INVALID_SESSION",
                "No chat session for this browser. Reload the page to start one.".to_string(),
            ),
            AppError::Chat(ChatError::StorageUnavailable(e)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORAGE_UNAVAILABLE",
                format!("Conversation store unavailable: {e}"),
            ),
            AppError::Chat(ChatError::ModelInvocationFailed(e)) => (
                StatusCode::BAD_GATEWAY,
                "MODEL_INVOCATION_FAILED",
                format!("Model invocation failed: {e}"),
            ),
            AppError::UnreadableBody(detail) => (
                StatusCode::BAD_REQUEST,
                "INVALID_BODY",
                format!("Could not read the chat message: {detail}"),
            ),
            AppError::UnsupportedMediaType(content_type) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                if content_type.is_empty() {
                    "Send the chat message as form data.".to_string()
                } else {
                    format!("Send the chat message as form data, not {content_type}.")
                },
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, %message, "Request failed");
        } else {
            tracing::debug!(code, %message, "Request rejected");
        }

        let request_id = uuid::Uuid::new_v4().to_string();
        let body = serde_json::to_string(&ApiResponse::error(code, &message, request_id))
            .unwrap_or_else(|_| {
                r#"{"data":null,"errors":[{"code":"SERIALIZATION_ERROR","message":"Failed to serialize response"}]}"#.to_string()
            });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}
