//! Connection settings for OpenAI-compatible providers.

use std::time::Duration;

use secrecy::SecretString;

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`]; built from
/// `AppConfig` by [`crate::llm::create_provider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "openai").
    pub provider_name: String,
    /// Base URL for the API, without the trailing `/chat/completions`.
    pub base_url: String,
    /// Bearer token for authentication.
    pub api_key: SecretString,
    /// Model identifier (e.g., "gpt-4o").
    pub model: String,
    /// Upper bound on a single HTTP exchange.
    pub request_timeout: Duration,
}
