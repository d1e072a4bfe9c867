//! Application state wiring the chat pipeline together.
//!
//! The orchestrator is generic over its store and provider; AppState pins it
//! to SQLite and the type-erased provider so handlers see one concrete type.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use simplechat_core::chat::orchestrator::TurnOrchestrator;
use simplechat_core::chat::prompt::PromptAssembler;
use simplechat_core::chat::session::SessionRegistry;
use simplechat_core::llm::box_provider::BoxLlmProvider;
use simplechat_core::llm::gateway::ModelGateway;
use simplechat_infra::llm::create_provider;
use simplechat_infra::sqlite::history::SqliteHistoryStore;
use simplechat_infra::sqlite::pool::{DatabasePool, reset_store};
use simplechat_types::config::AppConfig;

/// Orchestrator pinned to the production store and provider.
pub type ConcreteOrchestrator = TurnOrchestrator<SqliteHistoryStore, BoxLlmProvider>;

/// Shared state handed to every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ConcreteOrchestrator>,
    pub sessions: Arc<SessionRegistry>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Initialize the application state: reset/open the store, build the
    /// provider, wire the orchestrator.
    ///
    /// Fails when no API credential is configured.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        if config.api_credential.is_none() {
            anyhow::bail!(
                "no API credential configured; set OPENAI_API_KEY, pass --api-key, or add api_credential to the config file"
            );
        }

        if config.reset_store_on_start {
            reset_store(&config.store_location).with_context(|| {
                format!("failed to reset conversation store at {}", config.store_location)
            })?;
        }

        let store = open_history_store(&config).await?;
        let provider = create_provider(&config).context("failed to create LLM provider")?;

        Ok(Self::from_parts(store, provider, config))
    }

    /// Assemble state from already-built parts.
    pub fn from_parts(store: SqliteHistoryStore, provider: BoxLlmProvider, config: AppConfig) -> Self {
        let assembler = PromptAssembler::new(config.system_prompt.clone(), config.model_name.clone())
            .with_window(config.history_window)
            .with_max_tokens(config.max_tokens)
            .with_temperature(config.temperature);
        let gateway = ModelGateway::new(provider, Duration::from_secs(config.request_timeout_secs));

        Self {
            orchestrator: Arc::new(TurnOrchestrator::new(store, assembler, gateway)),
            sessions: Arc::new(SessionRegistry::with_limits(
                config.max_sessions,
                Duration::from_secs(config.session_idle_timeout_secs),
            )),
            config: Arc::new(config),
        }
    }
}

/// Open the configured conversation store, creating it if needed.
pub async fn open_history_store(config: &AppConfig) -> anyhow::Result<SqliteHistoryStore> {
    let pool = DatabasePool::open(&config.store_location)
        .await
        .with_context(|| format!("failed to open conversation store at {}", config.store_location))?;
    Ok(SqliteHistoryStore::new(pool))
}
