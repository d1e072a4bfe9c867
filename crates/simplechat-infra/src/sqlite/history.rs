//! SQLite conversation history implementation.
//!
//! Implements `HistoryStore` from `simplechat-core` using sqlx with split
//! read/write pools. Loads go through the reader pool; appends go through
//! the single writer connection.

use chrono::{DateTime, SecondsFormat, Utc};
use simplechat_core::history::store::HistoryStore;
use simplechat_types::chat::{MessageRole, SessionId, SessionSummary, Turn};
use simplechat_types::error::RepositoryError;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `HistoryStore`.
pub struct SqliteHistoryStore {
    pool: DatabasePool,
}

impl SqliteHistoryStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct TurnRow {
    id: i64,
    session_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl TurnRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_turn(self) -> Result<Turn, RepositoryError> {
        let session_id = self
            .session_id
            .parse::<SessionId>()
            .map_err(|e| RepositoryError::Query(format!("invalid session_id: {e}")))?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(Turn {
            session_id,
            sequence: self.id,
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

struct SessionSummaryRow {
    session_id: String,
    turn_count: i64,
    first_turn_at: String,
    last_turn_at: String,
}

impl SessionSummaryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            session_id: row.try_get("session_id")?,
            turn_count: row.try_get("turn_count")?,
            first_turn_at: row.try_get("first_turn_at")?,
            last_turn_at: row.try_get("last_turn_at")?,
        })
    }

    fn into_summary(self) -> Result<SessionSummary, RepositoryError> {
        let session_id = self
            .session_id
            .parse::<SessionId>()
            .map_err(|e| RepositoryError::Query(format!("invalid session_id: {e}")))?;

        Ok(SessionSummary {
            session_id,
            turn_count: self.turn_count as u32,
            first_turn_at: parse_datetime(&self.first_turn_at)?,
            last_turn_at: parse_datetime(&self.last_turn_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width RFC 3339 so MIN/MAX over the text column sort chronologically.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn map_sqlx_error(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection(e.to_string())
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

fn persisted_role(role: MessageRole) -> Result<&'static str, RepositoryError> {
    match role {
        MessageRole::User => Ok("user"),
        MessageRole::Assistant => Ok("assistant"),
        MessageRole::System => Err(RepositoryError::Query(
            "system messages are not part of the conversation log".to_string(),
        )),
    }
}

const INSERT_TURN: &str =
    "INSERT INTO chat_turns (session_id, role, content, created_at) VALUES (?, ?, ?, ?)";

// ---------------------------------------------------------------------------
// HistoryStore implementation
// ---------------------------------------------------------------------------

impl HistoryStore for SqliteHistoryStore {
    async fn load(&self, session_id: &SessionId) -> Result<Vec<Turn>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, session_id, role, content, created_at FROM chat_turns WHERE session_id = ? ORDER BY id ASC",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_error)?;

        let mut turns = Vec::with_capacity(rows.len());
        for row in &rows {
            let turn_row = TurnRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            turns.push(turn_row.into_turn()?);
        }

        Ok(turns)
    }

    async fn append(
        &self,
        session_id: &SessionId,
        role: MessageRole,
        content: &str,
    ) -> Result<Turn, RepositoryError> {
        let role_str = persisted_role(role)?;
        let created_at = Utc::now();

        let result = sqlx::query(INSERT_TURN)
            .bind(session_id.to_string())
            .bind(role_str)
            .bind(content)
            .bind(format_datetime(&created_at))
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_error)?;

        Ok(Turn {
            session_id: *session_id,
            sequence: result.last_insert_rowid(),
            role,
            content: content.to_string(),
            created_at,
        })
    }

    async fn append_exchange(
        &self,
        session_id: &SessionId,
        user_content: &str,
        assistant_content: &str,
    ) -> Result<(Turn, Turn), RepositoryError> {
        let session_key = session_id.to_string();
        let created_at = Utc::now();
        let created_at_str = format_datetime(&created_at);

        let mut tx = self.pool.writer.begin().await.map_err(map_sqlx_error)?;

        let user_result = sqlx::query(INSERT_TURN)
            .bind(&session_key)
            .bind("user")
            .bind(user_content)
            .bind(&created_at_str)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let assistant_result = sqlx::query(INSERT_TURN)
            .bind(&session_key)
            .bind("assistant")
            .bind(assistant_content)
            .bind(&created_at_str)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        let user = Turn {
            session_id: *session_id,
            sequence: user_result.last_insert_rowid(),
            role: MessageRole::User,
            content: user_content.to_string(),
            created_at,
        };
        let assistant = Turn {
            session_id: *session_id,
            sequence: assistant_result.last_insert_rowid(),
            role: MessageRole::Assistant,
            content: assistant_content.to_string(),
            created_at,
        };
        Ok((user, assistant))
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT session_id,
                      COUNT(*) AS turn_count,
                      MIN(created_at) AS first_turn_at,
                      MAX(created_at) AS last_turn_at
               FROM chat_turns
               GROUP BY session_id
               ORDER BY MAX(id) DESC"#,
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_error)?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in &rows {
            let summary_row =
                SessionSummaryRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            summaries.push(summary_row.into_summary()?);
        }

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> SqliteHistoryStore {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        SqliteHistoryStore::new(DatabasePool::new(&url).await.unwrap())
    }

    #[tokio::test]
    async fn test_load_empty_session() {
        let store = test_store().await;
        let turns = store.load(&SessionId::generate()).await.unwrap();
        assert!(turns.is_empty());
    }

    #[tokio::test]
    async fn test_load_returns_insertion_order_for_one_session_only() {
        let store = test_store().await;
        let a = SessionId::generate();
        let b = SessionId::generate();

        store.append(&a, MessageRole::User, "a1").await.unwrap();
        store.append(&b, MessageRole::User, "b1").await.unwrap();
        store.append(&a, MessageRole::Assistant, "a2").await.unwrap();
        store.append(&b, MessageRole::Assistant, "b2").await.unwrap();
        store.append(&a, MessageRole::User, "a3").await.unwrap();

        let turns = store.load(&a).await.unwrap();
        let contents: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["a1", "a2", "a3"]);
        assert!(turns.iter().all(|t| t.session_id == a));
        assert!(turns.windows(2).all(|w| w[0].sequence < w[1].sequence));

        let other = store.load(&b).await.unwrap();
        assert_eq!(other.len(), 2);
        assert_eq!(other[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_append_returns_stored_turn() {
        let store = test_store().await;
        let session = SessionId::generate();

        let turn = store
            .append(&session, MessageRole::User, "Is Grim Fandango canon?")
            .await
            .unwrap();
        let loaded = store.load(&session).await.unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].sequence, turn.sequence);
        assert_eq!(loaded[0].content, turn.content);
        assert_eq!(
            loaded[0].created_at.timestamp_micros(),
            turn.created_at.timestamp_micros()
        );
    }

    #[tokio::test]
    async fn test_append_rejects_system_role() {
        let store = test_store().await;
        let session = SessionId::generate();

        let err = store
            .append(&session, MessageRole::System, "be nice")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Query(_)));
        assert!(store.load(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_exchange_writes_user_then_assistant() {
        let store = test_store().await;
        let session = SessionId::generate();

        let (user, assistant) = store
            .append_exchange(&session, "Hello", "Hi! Ask me about adventure games.")
            .await
            .unwrap();
        assert!(user.sequence < assistant.sequence);

        let turns = store.load(&session).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, MessageRole::User);
        assert_eq!(turns[0].content, "Hello");
        assert_eq!(turns[1].role, MessageRole::Assistant);
        assert_eq!(turns[1].content, "Hi! Ask me about adventure games.");
    }

    #[tokio::test]
    async fn test_append_exchange_is_all_or_nothing() {
        let store = test_store().await;
        let session = SessionId::generate();

        // Make the second insert of the exchange violate a constraint.
        sqlx::query(
            r#"CREATE TRIGGER reject_assistant BEFORE INSERT ON chat_turns
               WHEN NEW.role = 'assistant'
               BEGIN SELECT RAISE(ABORT, 'assistant writes disabled'); END"#,
        )
        .execute(&store.pool().writer)
        .await
        .unwrap();

        let err = store
            .append_exchange(&session, "Hello", "reply")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Query(_)));
        assert!(store.load(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_content_is_stored() {
        let store = test_store().await;
        let session = SessionId::generate();

        store.append_exchange(&session, "", "You said nothing.").await.unwrap();
        let turns = store.load(&session).await.unwrap();
        assert_eq!(turns[0].content, "");
    }

    #[tokio::test]
    async fn test_list_sessions_most_recent_first() {
        let store = test_store().await;
        let older = SessionId::generate();
        let newer = SessionId::generate();

        store.append_exchange(&older, "q1", "a1").await.unwrap();
        store.append_exchange(&newer, "q1", "a1").await.unwrap();
        store.append_exchange(&older, "q2", "a2").await.unwrap();
        store.append_exchange(&newer, "q2", "a2").await.unwrap();
        store.append_exchange(&newer, "q3", "a3").await.unwrap();

        let sessions = store.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_id, newer);
        assert_eq!(sessions[0].turn_count, 6);
        assert_eq!(sessions[1].session_id, older);
        assert_eq!(sessions[1].turn_count, 4);
        assert!(sessions[1].first_turn_at <= sessions[1].last_turn_at);
    }

    #[tokio::test]
    async fn test_closed_pool_reports_connection_error() {
        let store = test_store().await;
        store.pool().close().await;

        let err = store.load(&SessionId::generate()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Connection(_)));
    }

    #[tokio::test]
    async fn test_in_memory_store_round_trip() {
        let store = SqliteHistoryStore::new(DatabasePool::open(":memory:").await.unwrap());
        let session = SessionId::generate();

        store
            .append_exchange(&session, "Who made Monkey Island?", "Ron Gilbert.")
            .await
            .unwrap();

        let turns = store.load(&session).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].content, "Ron Gilbert.");
    }

    mod orchestrated {
        use std::sync::Arc;
        use std::time::Duration;

        use simplechat_core::chat::orchestrator::TurnOrchestrator;
        use simplechat_core::chat::prompt::PromptAssembler;
        use simplechat_core::llm::gateway::ModelGateway;
        use simplechat_core::llm::provider::LlmProvider;
        use simplechat_types::llm::{
            CompletionRequest, CompletionResponse, LlmError, StopReason, Usage,
        };

        use super::*;

        /// Replies with how many earlier messages the request carried.
        struct CountingProvider;

        impl LlmProvider for CountingProvider {
            fn name(&self) -> &str {
                "counting"
            }

            async fn complete(
                &self,
                request: &CompletionRequest,
            ) -> Result<CompletionResponse, LlmError> {
                tokio::task::yield_now().await;
                Ok(CompletionResponse {
                    id: "count".to_string(),
                    content: format!("{} earlier", request.messages.len() - 1),
                    model: request.model.clone(),
                    stop_reason: StopReason::EndTurn,
                    usage: Usage::default(),
                })
            }
        }

        #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
        async fn test_sessions_sending_same_input_concurrently_stay_isolated() {
            let orch = Arc::new(TurnOrchestrator::new(
                test_store().await,
                PromptAssembler::default(),
                ModelGateway::new(CountingProvider, Duration::from_secs(5)),
            ));
            let sessions: Vec<SessionId> = (0..6).map(|_| SessionId::generate()).collect();

            let mut handles = Vec::new();
            for session in sessions.iter().copied() {
                let orch = Arc::clone(&orch);
                handles.push(tokio::spawn(async move {
                    let mut replies = Vec::new();
                    for _ in 0..3 {
                        let reply = orch
                            .handle(&session, Some("Which LucasArts game came first?".to_string()))
                            .await
                            .unwrap();
                        replies.push(reply);
                    }
                    replies
                }));
            }

            for handle in handles {
                // Each session only ever sees its own growing history.
                assert_eq!(handle.await.unwrap(), vec!["0 earlier", "2 earlier", "4 earlier"]);
            }

            for session in &sessions {
                let turns = orch.store().load(session).await.unwrap();
                assert_eq!(turns.len(), 6);
                assert!(turns.iter().all(|t| &t.session_id == session));
                let roles: Vec<MessageRole> = turns.iter().map(|t| t.role).collect();
                assert_eq!(
                    roles,
                    [MessageRole::User, MessageRole::Assistant].repeat(3)
                );
            }

            let summaries = orch.store().list_sessions().await.unwrap();
            assert_eq!(summaries.len(), sessions.len());
        }
    }
}
