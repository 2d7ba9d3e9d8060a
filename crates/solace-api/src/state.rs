//! Application state wiring services to their infra implementations.

use std::sync::Arc;

use solace_core::session::SessionService;
use solace_infra::sqlite::pool::{default_database_url, DatabasePool};
use solace_infra::sqlite::session::SqliteSessionRepository;

/// Concrete service type pinned to the SQLite repository.
pub type ConcreteSessionService = SessionService<SqliteSessionRepository>;

/// Shared application state used by the CLI and the REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<ConcreteSessionService>,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to the database, wire
    /// the session service.
    pub async fn init() -> anyhow::Result<Self> {
        Self::init_with_url(&default_database_url()).await
    }

    /// Initialize against an explicit database URL (used by tests).
    pub async fn init_with_url(database_url: &str) -> anyhow::Result<Self> {
        if let Some(dir) = data_dir_of(database_url) {
            tokio::fs::create_dir_all(dir).await?;
        }

        let db_pool = DatabasePool::new(database_url).await?;
        let session_service = SessionService::new(SqliteSessionRepository::new(db_pool.clone()));

        Ok(Self {
            session_service: Arc::new(session_service),
            db_pool,
        })
    }
}

/// Parent directory of a `sqlite://` URL's database file, if any.
fn data_dir_of(database_url: &str) -> Option<&std::path::Path> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next()?;
    std::path::Path::new(path).parent().filter(|p| !p.as_os_str().is_empty())
}
