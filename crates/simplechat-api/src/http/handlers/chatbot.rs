//! POST /chatbot - one chat turn.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::http::error::AppError;
use crate::http::extractors::message::ChatMessage;
use crate::http::extractors::session::CurrentSession;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ChatbotReply {
    pub message: String,
}

/// Forward the user's message to the model and return its reply.
///
/// A form without a `message` field is forwarded as the empty string.
pub async fn chatbot(
    State(state): State<AppState>,
    CurrentSession(session_id): CurrentSession,
    ChatMessage(message): ChatMessage,
) -> Result<Json<ChatbotReply>, AppError> {
    let reply = state.orchestrator.handle(&session_id, message).await?;

    Ok(Json(ChatbotReply { message: reply }))
}
