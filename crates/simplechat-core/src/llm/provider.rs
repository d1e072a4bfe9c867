//! LlmProvider trait definition.
//!
//! This is the core abstraction that every hosted completion backend
//! implements. Uses RPITIT for `complete`.

use simplechat_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for LLM provider backends (OpenAI and compatible APIs).
///
/// Implementations live in simplechat-infra (e.g., `OpenAiCompatibleProvider`).
/// A provider performs exactly one network call per `complete`; it never
/// retries.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
