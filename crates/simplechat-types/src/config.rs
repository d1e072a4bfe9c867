//! Application configuration types for SimpleChat.
//!
//! `AppConfig` represents the `simplechat.toml` file. Every field has a
//! default so an absent or empty file yields a runnable configuration
//! (apart from the API credential, which must come from somewhere).

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

/// Default system instruction sent ahead of every conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a virtual assistant named 'SimpleChatBot'. \
You are an expert on video-games focused on point-and-click adventure games.";

/// Number of trailing history turns handed to the model per request.
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Top-level configuration.
///
/// `api_credential` is never serialized and is redacted in `Debug` output.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Which hosted model to call (e.g., "gpt-4o").
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Auth secret for the model API.
    #[serde(
        default,
        skip_serializing,
        deserialize_with = "deserialize_secret"
    )]
    pub api_credential: Option<SecretString>,

    /// Base URL of the OpenAI-compatible completion API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Connection target for the persistence backend: a file path or a `sqlite:` URL.
    #[serde(default = "default_store_location")]
    pub store_location: String,

    /// Delete the store file at startup, discarding every prior session.
    #[serde(default)]
    pub reset_store_on_start: bool,

    /// Trailing history turns passed to the model.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Fixed system instruction.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Upper bound on a single model call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum tokens the model may generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature; provider default when absent.
    #[serde(default)]
    pub temperature: Option<f64>,

    /// Address the web server binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the web server binds to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Most browser sessions remembered at once; the least recently used
    /// is forgotten beyond this.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Seconds a session may go unused before its cookie stops working.
    #[serde(default = "default_session_idle_timeout_secs")]
    pub session_idle_timeout_secs: u64,
}

fn default_model_name() -> String {
    "gpt-4o".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_store_location() -> String {
    "simple_chatbot.db".to_string()
}

fn default_history_window() -> usize {
    DEFAULT_HISTORY_WINDOW
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_sessions() -> usize {
    10_000
}

fn default_session_idle_timeout_secs() -> u64 {
    24 * 60 * 60
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .map(SecretString::from))
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            api_credential: None,
            base_url: default_base_url(),
            store_location: default_store_location(),
            reset_store_on_start: false,
            history_window: default_history_window(),
            system_prompt: default_system_prompt(),
            request_timeout_secs: default_request_timeout_secs(),
            max_tokens: default_max_tokens(),
            temperature: None,
            host: default_host(),
            port: default_port(),
            max_sessions: default_max_sessions(),
            session_idle_timeout_secs: default_session_idle_timeout_secs(),
        }
    }
}
