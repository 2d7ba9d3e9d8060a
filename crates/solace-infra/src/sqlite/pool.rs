//! SQLite connection pools.
//!
//! Since SQLite allows only one writer at a time, `DatabasePool` keeps a
//! single-connection writer pool so message and session writes serialize
//! instead of racing on the busy handler, plus a small read-only pool so
//! history fetches never queue behind a write. Chat traffic is bursty but
//! light (one exchange in flight per session), so the reader pool stays
//! small.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Reader pool size. Reads are short point lookups and per-session
/// history scans; a handful of connections covers them.
const READER_CONNECTIONS: u32 = 4;

/// Split read/write pool for SQLite with WAL mode.
#[derive(Clone)]
pub struct DatabasePool {
    /// Read-only pool for SELECT queries.
    pub reader: SqlitePool,
    /// Single-connection pool for serialized INSERT/UPDATE/DELETE.
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open the pools and run pending migrations.
    ///
    /// Both pools use WAL journal mode, foreign key enforcement, and a
    /// 5-second busy timeout. Migrations run on the writer before the
    /// reader opens, so the reader never sees a half-created schema.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let base_opts = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_secs(5))
            .create_if_missing(true);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(base_opts.clone())
            .await?;

        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(READER_CONNECTIONS)
            .connect_with(base_opts.read_only(true))
            .await?;

        Ok(Self { reader, writer })
    }
}

/// Returns the default database URL based on `SOLACE_DATA_DIR` env var,
/// falling back to `~/.solace/solace.db`.
pub fn default_database_url() -> String {
    let data_dir = std::env::var("SOLACE_DATA_DIR").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        format!("{home}/.solace")
    });
    format!("sqlite://{data_dir}/solace.db")
}
