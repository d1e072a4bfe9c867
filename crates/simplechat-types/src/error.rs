use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in simplechat-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// Errors surfaced by a chat turn.
///
/// Every variant aborts the request; nothing is retried and no partial
/// history is committed.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] RepositoryError),

    #[error("model invocation failed: {0}")]
    ModelInvocationFailed(#[from] LlmError),

    #[error("no chat session established for this browser")]
    InvalidSession,
}
