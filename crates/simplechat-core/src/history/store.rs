//! HistoryStore trait definition.
//!
//! Uses native async fn in traits (RPITIT, Rust 2024 edition), the same
//! pattern as `LlmProvider`.

use simplechat_types::chat::{MessageRole, SessionId, SessionSummary, Turn};
use simplechat_types::error::RepositoryError;

/// Append-only, per-session ordered log of chat turns.
///
/// Implementations live in simplechat-infra (e.g., `SqliteHistoryStore`).
/// Rows are isolated by session id: two distinct ids never observe each
/// other's turns. The backing table is created on first use.
pub trait HistoryStore: Send + Sync {
    /// Load every turn for a session, in insertion order.
    fn load(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, RepositoryError>> + Send;

    /// Append a single turn. Only `User` and `Assistant` roles are persisted.
    fn append(
        &self,
        session_id: &SessionId,
        role: MessageRole,
        content: &str,
    ) -> impl std::future::Future<Output = Result<Turn, RepositoryError>> + Send;

    /// Append a user turn followed by its assistant reply as one unit.
    ///
    /// Either both rows are written or neither is.
    fn append_exchange(
        &self,
        session_id: &SessionId,
        user_content: &str,
        assistant_content: &str,
    ) -> impl std::future::Future<Output = Result<(Turn, Turn), RepositoryError>> + Send;

    /// List every session that has stored turns, most recently active first.
    fn list_sessions(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<SessionSummary>, RepositoryError>> + Send;
}
