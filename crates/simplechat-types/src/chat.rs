//! Session and conversation turn types.
//!
//! A session is an opaque per-browser token; a turn is one persisted
//! user or assistant message belonging to exactly one session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

// Re-export MessageRole from llm module (turn roles and prompt roles share it).
pub use crate::llm::MessageRole;

/// Opaque identifier for a browser chat session, wrapping a random UUID v4.
///
/// v4 rather than v7: the id doubles as the only thing a browser presents,
/// so it must carry no guessable timestamp prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generate a fresh random session identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a SessionId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

/// A single persisted message within a session's history.
///
/// Turns are immutable once written and ordered by `sequence`, the store's
/// monotonic insertion key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub session_id: SessionId,
    pub sequence: i64,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Per-session aggregate used by the `sessions` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub turn_count: u32,
    pub first_turn_at: DateTime<Utc>,
    pub last_turn_at: DateTime<Utc>,
}
