//! Prompt assembly for a single chat turn.
//!
//! The request carries the fixed system instruction, the trailing window of
//! stored history in its original order, and the new user message last.
//! Older turns are dropped silently.

use simplechat_types::chat::Turn;
use simplechat_types::config::{DEFAULT_HISTORY_WINDOW, DEFAULT_SYSTEM_PROMPT};
use simplechat_types::llm::{CompletionRequest, Message};

/// Default cap on generated tokens per reply.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Builds `CompletionRequest`s from stored history and fresh user input.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    system_prompt: String,
    model: String,
    window: usize,
    max_tokens: u32,
    temperature: Option<f64>,
}

impl PromptAssembler {
    pub fn new(system_prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            model: model.into(),
            window: DEFAULT_HISTORY_WINDOW,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Assemble the request for `input` given the session's full history.
    ///
    /// Only the last `min(window, history.len())` turns are included.
    pub fn assemble(&self, history: &[Turn], input: &str) -> CompletionRequest {
        let start = history.len().saturating_sub(self.window);

        let mut messages: Vec<Message> = history[start..]
            .iter()
            .map(|turn| Message {
                role: turn.role,
                content: turn.content.clone(),
            })
            .collect();
        messages.push(Message::user(input));

        CompletionRequest {
            model: self.model.clone(),
            messages,
            system: Some(self.system_prompt.clone()),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT, "gpt-4o")
    }
}
