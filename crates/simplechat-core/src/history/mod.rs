//! Conversation history persistence abstractions.
//!
//! Defines the `HistoryStore` trait that the infrastructure layer implements
//! as an append-only, per-session ordered log of turns.

pub mod store;

#[cfg(test)]
pub(crate) mod memory;
