//! EntryStore Storage - SQLite persistence for entry records
//!
//! ## Architecture
//!
//! This crate implements the `IEntryRepository` port from `entrystore-core`
//! using SQLite as the storage backend. It is a driven (secondary) adapter
//! in the hexagonal architecture.
//!
//! ## Key Components
//!
//! - [`DatabasePool`] - Connection pool with migration support
//! - [`SqliteEntryRepository`] - Full `IEntryRepository` implementation
//! - [`StorageError`] - Error types for storage operations
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use entrystore_storage::{DatabasePool, SqliteEntryRepository};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = DatabasePool::new(Path::new("/var/lib/entrystore/entries.db")).await?;
//! let repo = SqliteEntryRepository::new(pool.pool().clone());
//! // Use repo as IEntryRepository...
//! # Ok(())
//! # }
//! ```

pub mod pool;
pub mod repository;

pub use pool::DatabasePool;
pub use repository::SqliteEntryRepository;

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A stored audit trail could not be encoded or decoded
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        StorageError::QueryFailed(e.to_string())
    }
}
