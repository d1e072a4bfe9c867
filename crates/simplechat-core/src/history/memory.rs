//! In-memory `HistoryStore` used by the core unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use simplechat_types::chat::{MessageRole, SessionId, SessionSummary, Turn};
use simplechat_types::error::RepositoryError;

use super::store::HistoryStore;

#[derive(Default)]
pub(crate) struct InMemoryHistoryStore {
    turns: Mutex<Vec<Turn>>,
    unavailable: AtomicBool,
    read_only: AtomicBool,
}

impl InMemoryHistoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the database were unreachable.
    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Let loads succeed but fail every write.
    pub(crate) fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    pub(crate) fn total_turns(&self) -> usize {
        self.turns.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection("store offline".to_string()));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<(), RepositoryError> {
        self.check()?;
        if self.read_only.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("attempt to write a readonly database".to_string()));
        }
        Ok(())
    }

    fn push(turns: &mut Vec<Turn>, session_id: &SessionId, role: MessageRole, content: &str) -> Turn {
        let turn = Turn {
            session_id: *session_id,
            sequence: turns.len() as i64 + 1,
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        turns.push(turn.clone());
        turn
    }
}

impl HistoryStore for InMemoryHistoryStore {
    async fn load(&self, session_id: &SessionId) -> Result<Vec<Turn>, RepositoryError> {
        self.check()?;
        let turns = self.turns.lock().unwrap();
        Ok(turns
            .iter()
            .filter(|t| &t.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn append(
        &self,
        session_id: &SessionId,
        role: MessageRole,
        content: &str,
    ) -> Result<Turn, RepositoryError> {
        self.check_writable()?;
        let mut turns = self.turns.lock().unwrap();
        Ok(Self::push(&mut turns, session_id, role, content))
    }

    async fn append_exchange(
        &self,
        session_id: &SessionId,
        user_content: &str,
        assistant_content: &str,
    ) -> Result<(Turn, Turn), RepositoryError> {
        self.check_writable()?;
        let mut turns = self.turns.lock().unwrap();
        let user = Self::push(&mut turns, session_id, MessageRole::User, user_content);
        let assistant = Self::push(&mut turns, session_id, MessageRole::Assistant, assistant_content);
        Ok((user, assistant))
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, RepositoryError> {
        self.check()?;
        let turns = self.turns.lock().unwrap();
        let mut summaries: Vec<SessionSummary> = Vec::new();
        for turn in turns.iter() {
            match summaries.iter_mut().find(|s| s.session_id == turn.session_id) {
                Some(summary) => {
                    summary.turn_count += 1;
                    summary.last_turn_at = turn.created_at;
                }
                None => summaries.push(SessionSummary {
                    session_id: turn.session_id,
                    turn_count: 1,
                    first_turn_at: turn.created_at,
                    last_turn_at: turn.created_at,
                }),
            }
        }
        summaries.reverse();
        Ok(summaries)
    }
}
