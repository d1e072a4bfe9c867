//! Infrastructure layer for SimpleChat.
//!
//! Contains implementations of the ports defined in `simplechat-core`:
//! SQLite-backed conversation history, the OpenAI-compatible completion
//! client, and the TOML configuration loader.

pub mod config;
pub mod llm;
pub mod sqlite;
