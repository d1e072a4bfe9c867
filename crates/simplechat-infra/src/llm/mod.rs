//! LLM provider implementations.
//!
//! Contains the OpenAI-compatible implementation of the [`LlmProvider`]
//! trait defined in `simplechat-core`, and a factory ([`create_provider`])
//! that builds it from the application configuration.
//!
//! [`LlmProvider`]: simplechat_core::llm::provider::LlmProvider

pub mod openai_compat;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use simplechat_core::llm::box_provider::BoxLlmProvider;
use simplechat_types::config::AppConfig;
use simplechat_types::llm::LlmError;

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::OpenAiCompatConfig;

/// Create a [`BoxLlmProvider`] from the application configuration.
///
/// # Errors
///
/// Returns `LlmError::AuthenticationFailed` if no API credential is
/// configured.
pub fn create_provider(config: &AppConfig) -> Result<BoxLlmProvider, LlmError> {
    let key = config
        .api_credential
        .as_ref()
        .ok_or(LlmError::AuthenticationFailed)?;

    let provider = OpenAiCompatibleProvider::new(OpenAiCompatConfig {
        provider_name: "openai".to_string(),
        base_url: config.base_url.clone(),
        api_key: SecretString::from(key.expose_secret().to_owned()),
        model: config.model_name.clone(),
        request_timeout: Duration::from_secs(config.request_timeout_secs),
    })?;

    Ok(BoxLlmProvider::new(provider))
}
