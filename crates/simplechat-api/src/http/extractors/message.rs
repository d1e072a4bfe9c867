//! Chat message body extractor.
//!
//! The page posts its `message` field either URL-encoded or as
//! `multipart/form-data` (what a browser `FormData` sends). Both are read
//! the same way. A readable body without a `message` field yields `None`,
//! which the orchestrator forwards as an empty message.

use axum::Form;
use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use serde::Deserialize;

use crate::http::error::AppError;

/// Name of the form field carrying the user's text.
pub const MESSAGE_FIELD: &str = "message";

/// URL-encoded form body posted by the chat page.
#[derive(Debug, Deserialize)]
pub struct ChatbotForm {
    pub message: Option<String>,
}

/// The user's message, if the body carried one.
pub struct ChatMessage(pub Option<String>);

impl<S: Send + Sync> FromRequest<S> for ChatMessage {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|rejection| AppError::UnreadableBody(rejection.body_text()))?;

            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| AppError::UnreadableBody(e.body_text()))?
            {
                if field.name() != Some(MESSAGE_FIELD) {
                    continue;
                }
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::UnreadableBody(e.body_text()))?;
                return Ok(ChatMessage(Some(text)));
            }
            return Ok(ChatMessage(None));
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(form) = Form::<ChatbotForm>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::UnreadableBody(rejection.body_text()))?;
            return Ok(ChatMessage(form.message));
        }

        // No declared type: only an empty body is acceptable.
        if content_type.is_empty() {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|rejection| AppError::UnreadableBody(rejection.body_text()))?;
            if body.is_empty() {
                return Ok(ChatMessage(None));
            }
        }

        Err(AppError::UnsupportedMediaType(content_type))
    }
}
