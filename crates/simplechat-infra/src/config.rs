//! Configuration loader for SimpleChat.
//!
//! Reads `simplechat.toml` (or the file given with `--config`) and
//! deserializes it into [`AppConfig`]. Falls back to defaults when the file
//! is missing or malformed. Command-line values are layered on top with
//! [`ConfigOverrides`].

use std::path::Path;

use secrecy::SecretString;

use simplechat_types::config::AppConfig;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "simplechat.toml";

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_config(path: &Path) -> AppConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            AppConfig::default()
        }
    }
}

/// Values supplied on the command line or through the environment.
///
/// Every `Some` field replaces the file value; `reset_store` only ever
/// turns the reset on.
#[derive(Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub model_name: Option<String>,
    pub store_location: Option<String>,
    pub reset_store: bool,
    pub api_credential: Option<SecretString>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut AppConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(model) = self.model_name {
            config.model_name = model;
        }
        if let Some(store) = self.store_location {
            config.store_location = store;
        }
        if self.reset_store {
            config.reset_store_on_start = true;
        }
        if let Some(key) = self.api_credential {
            config.api_credential = Some(key);
        }
    }
}
