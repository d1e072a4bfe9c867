//! Chat turn logic and port definitions for SimpleChat.
//!
//! This crate defines the "ports" (history store and LLM provider traits)
//! that the infrastructure layer implements, plus the pieces that tie a
//! turn together: session registry, prompt assembler, model gateway and
//! turn orchestrator. It depends only on `simplechat-types` -- never on
//! `simplechat-infra` or any database/IO crate.

pub mod chat;
pub mod history;
pub mod llm;
