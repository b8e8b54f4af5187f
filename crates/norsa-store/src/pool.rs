//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  Terminal startup                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreConfig::new(path) ← Configure pool settings                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.sessions()  db.printer_config()  db.journal()                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  local_state (key TEXT PRIMARY KEY, value TEXT, updated_at TEXT)       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! On-disk databases use WAL so a crash between writes never corrupts the
//! session or the printer config. In-memory databases skip it.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::repository::journal::JournalRepository;
use crate::repository::printer::PrinterConfigRepository;
use crate::repository::session::SessionRepository;
use crate::repository::state::LocalStateRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Where the database lives and how the pool behaves.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite file, or `None` for an in-memory database.
    pub database_path: Option<PathBuf>,

    /// Maximum number of connections in the pool.
    /// Default: 4 (one operator, a handful of concurrent reads)
    pub max_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl StoreConfig {
    /// Creates a configuration for an on-disk database.
    ///
    /// The file and its parent directory are created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            database_path: Some(path.into()),
            max_connections: 4,
            connect_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// In-memory SQLite is per connection, so the pool is pinned to one.
    pub fn in_memory() -> Self {
        StoreConfig {
            database_path: None,
            max_connections: 1,
            connect_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the local state database.
///
/// Cheap to clone; every repository accessor clones the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database and runs migrations (if enabled).
    pub async fn new(config: StoreConfig) -> StoreResult<Self> {
        let (connect_options, pool_options) = match &config.database_path {
            Some(path) => {
                info!(path = %path.display(), "Opening local state database");

                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)
                            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;
                    }
                }

                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal)
                    .create_if_missing(true);

                (options, SqlitePoolOptions::new())
            }
            None => {
                info!("Opening in-memory local state database");

                let options = SqliteConnectOptions::from_str("sqlite::memory:")
                    .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

                // Dropping the only connection would drop the data
                let pool = SqlitePoolOptions::new()
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None);

                (options, pool)
            }
        };

        debug!("Connection options configured");

        let pool = pool_options
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        info!(max_connections = config.max_connections, "Database pool created");

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations.
    pub async fn run_migrations(&self) -> StoreResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Raw key/value access.
    pub fn state(&self) -> LocalStateRepository {
        LocalStateRepository::new(self.pool.clone())
    }

    /// Persisted merchant session.
    pub fn sessions(&self) -> SessionRepository {
        SessionRepository::new(self.state())
    }

    /// Persisted printer geometry.
    pub fn printer_config(&self) -> PrinterConfigRepository {
        PrinterConfigRepository::new(self.state())
    }

    /// Daily report timestamp and last printed receipt.
    pub fn journal(&self) -> JournalRepository {
        JournalRepository::new(self.state())
    }

    /// Removes every stored value. Used on logout.
    pub async fn clear_all(&self) -> StoreResult<()> {
        let removed = self.state().clear().await?;
        info!(removed, "Local state cleared");
        Ok(())
    }

    /// Closes the connection pool.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use norsa_core::PrinterConfig;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
    }

    #[tokio::test]
    async fn test_on_disk_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("terminal.db");

        let config = PrinterConfig {
            dpi: 203,
            width_mm: 58,
            chars_per_line: 32,
        };

        {
            let db = Database::new(StoreConfig::new(&path)).await.unwrap();
            db.printer_config().save(&config).await.unwrap();
            db.close().await;
        }

        let db = Database::new(StoreConfig::new(&path)).await.unwrap();
        assert_eq!(db.printer_config().get().await.unwrap(), config);
    }

    #[test]
    fn test_config_builder() {
        let config = StoreConfig::new("/tmp/terminal.db")
            .max_connections(2)
            .run_migrations(false);

        assert_eq!(config.max_connections, 2);
        assert!(!config.run_migrations);
        assert!(StoreConfig::in_memory().database_path.is_none());
    }
}
