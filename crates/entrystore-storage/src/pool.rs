//! Database connection pool management
//!
//! Provides a wrapper around SQLx's SqlitePool with:
//! - Automatic directory creation for database files
//! - WAL journal mode for concurrent reads
//! - Automatic schema migration on first connection
//! - In-memory mode for testing

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use entrystore_core::config::StorageConfig;

use crate::StorageError;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 5;

/// Manages a pool of SQLite connections for entry persistence
///
/// The pool is configured with:
/// - WAL journal mode for concurrent read access
/// - 5 max connections for file-based databases unless configured otherwise
/// - 1 connection for in-memory databases (required for data persistence)
/// - 5-second busy timeout to handle write contention
#[derive(Clone)]
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    /// Creates a new database pool connected to the specified file
    ///
    /// This will:
    /// 1. Create parent directories if they don't exist
    /// 2. Create the database file if it doesn't exist
    /// 3. Enable WAL journal mode
    /// 4. Run schema migrations
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConnectionFailed` if the connection cannot be established,
    /// or `StorageError::MigrationFailed` if schema migrations fail.
    pub async fn new(db_path: &Path) -> Result<Self, StorageError> {
        Self::connect(
            db_path,
            DEFAULT_MAX_CONNECTIONS,
            Duration::from_secs(DEFAULT_BUSY_TIMEOUT_SECS),
        )
        .await
    }

    /// Creates a pool using the path and limits from the `storage` config section
    pub async fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        Self::connect(
            &config.database_path,
            config.max_connections,
            Duration::from_secs(config.busy_timeout_secs),
        )
        .await
    }

    async fn connect(
        db_path: &Path,
        max_connections: u32,
        busy_timeout: Duration,
    ) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::ConnectionFailed(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                StorageError::ConnectionFailed(format!(
                    "Failed to connect to database at {}: {}",
                    db_path.display(),
                    e
                ))
            })?;

        Self::run_migrations(&pool).await?;

        tracing::info!(
            path = %db_path.display(),
            max_connections,
            "Database pool initialized"
        );

        Ok(Self { pool })
    }

    /// Creates an in-memory database pool for testing
    ///
    /// Uses a single connection to ensure data persistence across queries
    /// (SQLite in-memory databases are per-connection).
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConnectionFailed` if the connection cannot be established,
    /// or `StorageError::MigrationFailed` if schema migrations fail.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| {
                StorageError::ConnectionFailed(format!(
                    "Failed to create in-memory database: {}",
                    e
                ))
            })?;

        Self::run_migrations(&pool).await?;

        tracing::debug!("In-memory database pool initialized");

        Ok(Self { pool })
    }

    /// Returns a reference to the underlying SQLite connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes every connection; later queries fail
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Runs the initial schema migration
    async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
        let migration_sql = include_str!("migrations/20260301_initial.sql");
        sqlx::raw_sql(migration_sql)
            .execute(pool)
            .await
            .map_err(|e| {
                StorageError::MigrationFailed(format!("Failed to run initial migration: {}", e))
            })?;

        tracing::debug!("Database migrations completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_pool_has_entries_table() {
        let pool = DatabasePool::in_memory().await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entries")
            .fetch_one(pool.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_file_pool_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("entries.db");

        let config = StorageConfig {
            database_path: path.clone(),
            max_connections: 2,
            busy_timeout_secs: 1,
        };
        let pool = DatabasePool::from_config(&config).await.unwrap();
        assert!(path.exists());
        pool.close().await;

        // Migrations are idempotent across reopen
        let pool = DatabasePool::new(&path).await.unwrap();
        pool.close().await;
    }
}
