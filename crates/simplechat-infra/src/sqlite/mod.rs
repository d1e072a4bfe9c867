//! SQLite storage layer.
//!
//! Conversation history backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod history;
pub mod pool;
