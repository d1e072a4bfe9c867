//! Model invocation gateway.
//!
//! Wraps an `LlmProvider` with a hard deadline and folds every provider
//! failure into `ChatError::ModelInvocationFailed`. One request, one
//! network call: no retry, no backoff.

use std::time::Duration;

use tracing::{Instrument, debug, info_span, warn};

use simplechat_types::error::ChatError;
use simplechat_types::llm::{CompletionRequest, CompletionResponse, LlmError};

use super::provider::LlmProvider;

/// Default deadline for a single completion call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Bounded-time front for a completion provider.
pub struct ModelGateway<P: LlmProvider> {
    provider: P,
    timeout: Duration,
}

impl<P: LlmProvider> ModelGateway<P> {
    pub fn new(provider: P, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send the request and return the provider's response.
    ///
    /// A provider that has not answered within the configured timeout is
    /// abandoned and reported as `LlmError::Timeout`.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, ChatError> {
        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.request.message_count = request.messages.len(),
        );

        let outcome = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .instrument(span)
            .await;

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(provider = self.provider.name(), error = %e, "Model invocation failed");
                return Err(ChatError::ModelInvocationFailed(e));
            }
            Err(_elapsed) => {
                let ms = self.timeout.as_millis() as u64;
                warn!(provider = self.provider.name(), timeout_ms = ms, "Model invocation timed out");
                return Err(ChatError::ModelInvocationFailed(LlmError::Timeout(ms)));
            }
        };

        debug!(
            response_id = %response.id,
            stop_reason = %response.stop_reason,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Model invocation completed"
        );

        Ok(response)
    }
}
