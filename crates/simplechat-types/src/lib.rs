//! Shared domain types for SimpleChat.
//!
//! Sessions, conversation turns, LLM request/response shapes, configuration,
//! and the error taxonomy shared by every layer.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
