//! Database pool with split reader/writer connections in WAL mode.
//!
//! SQLite allows only one writer at a time. `DatabasePool` pairs a
//! multi-connection reader pool for concurrent history loads with a
//! single-connection writer pool that serializes appends.

use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

/// Split read/write pool for SQLite with WAL mode.
///
/// - `reader`: Multi-connection pool (up to 8) for concurrent SELECT queries.
/// - `writer`: Single-connection pool for serialized INSERTs.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Create a new DatabasePool from a `sqlite:` URL.
    ///
    /// Runs migrations automatically on the writer pool, so the history
    /// table exists before the first request. Both pools use WAL journal
    /// mode and a 5-second busy timeout; the file is created if missing.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let opts = SqliteConnectOptions::from_str(database_url)?;
        if store_file_path(database_url).is_none() {
            Self::connect_in_memory(opts).await
        } else {
            Self::connect(opts).await
        }
    }

    /// Open the store named by a configured location.
    ///
    /// Accepts either a `sqlite:` URL or a plain filesystem path.
    /// `:memory:` and `sqlite::memory:` give a private in-memory store.
    pub async fn open(store_location: &str) -> Result<Self, sqlx::Error> {
        if is_sqlite_url(store_location) {
            Self::new(store_location).await
        } else if store_file_path(store_location).is_none() {
            Self::new("sqlite::memory:").await
        } else {
            Self::connect(SqliteConnectOptions::new().filename(store_location)).await
        }
    }

    async fn connect(opts: SqliteConnectOptions) -> Result<Self, sqlx::Error> {
        let base_opts = opts
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let read_opts = base_opts.clone().read_only(true);
        let write_opts = base_opts;

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(write_opts)
            .await?;

        // Run migrations on writer before opening reader pool
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(read_opts)
            .await?;

        debug!("SQLite history store ready");
        Ok(Self { reader, writer })
    }

    /// Every in-memory connection is its own database, so reads and writes
    /// share one pinned connection that is never recycled.
    async fn connect_in_memory(opts: SqliteConnectOptions) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts.journal_mode(SqliteJournalMode::Memory))
            .await?;

        sqlx::migrate!("../../migrations").run(&pool).await?;

        debug!("In-memory SQLite history store ready");
        Ok(Self {
            reader: pool.clone(),
            writer: pool,
        })
    }

    /// Close both pools, flushing the WAL on the last writer connection.
    pub async fn close(&self) {
        self.reader.close().await;
        self.writer.close().await;
    }
}

fn is_sqlite_url(location: &str) -> bool {
    location.starts_with("sqlite:")
}

/// Resolve a configured store location to the database file it names.
///
/// Returns `None` for in-memory databases, which have no file.
pub fn store_file_path(store_location: &str) -> Option<PathBuf> {
    let raw = if is_sqlite_url(store_location) {
        let rest = store_location.trim_start_matches("sqlite:");
        let rest = rest.strip_prefix("//").unwrap_or(rest);
        rest.split('?').next().unwrap_or_default()
    } else {
        store_location
    };

    if raw.is_empty() || raw == ":memory:" {
        return None;
    }
    Some(PathBuf::from(raw))
}

/// Delete the database file and its WAL side files.
///
/// Returns `true` when the main database file existed and was removed.
/// Missing files are not an error.
pub fn reset_store(store_location: &str) -> io::Result<bool> {
    let Some(path) = store_file_path(store_location) else {
        return Ok(false);
    };

    let removed = remove_if_exists(&path)?;
    for suffix in ["-wal", "-shm"] {
        let mut side = path.clone().into_os_string();
        side.push(suffix);
        remove_if_exists(Path::new(&side))?;
    }

    if removed {
        info!(path = %path.display(), "Reset conversation store");
    }
    Ok(removed)
}

fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
