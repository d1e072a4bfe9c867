//! Turn orchestrator: one user message in, one assistant reply out.
//!
//! Each turn runs the same explicit pipeline:
//! 1. Load the session's history from the store
//! 2. Assemble the windowed completion request
//! 3. Invoke the model through the gateway
//! 4. Persist the user turn and the reply together
//!
//! A failure at any step aborts the turn. Nothing is written unless the
//! model produced a reply.

use tracing::{Instrument, info, info_span};

use simplechat_types::chat::SessionId;
use simplechat_types::error::ChatError;

use crate::history::store::HistoryStore;
use crate::llm::gateway::ModelGateway;
use crate::llm::provider::LlmProvider;

use super::prompt::PromptAssembler;

/// Coordinates history, prompt assembly and model invocation for a turn.
///
/// Generic over the store and provider so the same pipeline runs against
/// SQLite and the hosted API in production and against in-memory doubles
/// in tests. The session id is always passed in explicitly.
pub struct TurnOrchestrator<H: HistoryStore, P: LlmProvider> {
    store: H,
    assembler: PromptAssembler,
    gateway: ModelGateway<P>,
}

impl<H: HistoryStore, P: LlmProvider> TurnOrchestrator<H, P> {
    pub fn new(store: H, assembler: PromptAssembler, gateway: ModelGateway<P>) -> Self {
        Self {
            store,
            assembler,
            gateway,
        }
    }

    /// Access the underlying history store.
    pub fn store(&self) -> &H {
        &self.store
    }

    pub fn assembler(&self) -> &PromptAssembler {
        &self.assembler
    }

    pub fn gateway(&self) -> &ModelGateway<P> {
        &self.gateway
    }

    /// Handle one user message for `session_id` and return the reply text.
    ///
    /// Absent input is sent to the model as an empty message.
    pub async fn handle(
        &self,
        session_id: &SessionId,
        user_input: Option<String>,
    ) -> Result<String, ChatError> {
        let input = user_input.unwrap_or_default();

        let span = info_span!(
            "chat.turn",
            session_id = %session_id,
            input_chars = input.chars().count(),
        );

        async {
            let history = self.store.load(session_id).await?;
            let request = self.assembler.assemble(&history, &input);

            let response = self.gateway.complete(&request).await?;

            let (user_turn, assistant_turn) = self
                .store
                .append_exchange(session_id, &input, &response.content)
                .await?;

            info!(
                history_len = history.len(),
                user_seq = user_turn.sequence,
                assistant_seq = assistant_turn.sequence,
                "Chat turn recorded"
            );

            Ok::<_, ChatError>(response.content)
        }
        .instrument(span)
        .await
    }
}
