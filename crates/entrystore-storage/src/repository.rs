//! SQLite implementation of IEntryRepository
//!
//! This module provides the concrete SQLite-based implementation of the
//! entry repository port defined in entrystore-core.
//!
//! ## Type Mapping
//!
//! | Domain Type | SQL Type | Strategy                              |
//! |-------------|----------|---------------------------------------|
//! | key         | TEXT     | Primary key, plain string             |
//! | identity    | TEXT     | Plain string                          |
//! | payload     | TEXT     | Plain string                          |
//! | AuditTrail  | TEXT     | serde_json array of `AuditEvent`s     |

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use entrystore_core::domain::{AuditTrail, EntryRecord};
use entrystore_core::ports::{IEntryRepository, Page, RepositoryError, SortField};

use crate::StorageError;

/// SQLite-based implementation of the entry repository port
pub struct SqliteEntryRepository {
    pool: SqlitePool,
}

impl SqliteEntryRepository {
    /// Creates a new repository instance with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Number of stored entries
    pub async fn count(&self) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

// ============================================================================
// Helper functions for type conversion
// ============================================================================

fn audits_to_json(audits: &AuditTrail) -> Result<String, StorageError> {
    serde_json::to_string(audits).map_err(|e| {
        StorageError::SerializationError(format!("Failed to encode audit trail: {}", e))
    })
}

fn audits_from_json(s: &str) -> Result<AuditTrail, StorageError> {
    serde_json::from_str(s).map_err(|e| {
        StorageError::SerializationError(format!("Failed to decode audit trail '{}': {}", s, e))
    })
}

/// Reconstruct an EntryRecord from a database row
fn entry_from_row(row: &SqliteRow) -> Result<EntryRecord, StorageError> {
    let key: String = row.get("key");
    let identity: String = row.get("identity");
    let payload: String = row.get("payload");
    let audits: String = row.get("audits");

    Ok(EntryRecord::new(key, identity, payload).with_audits(audits_from_json(&audits)?))
}

fn backend(e: impl Into<StorageError>) -> RepositoryError {
    RepositoryError::Backend(anyhow::Error::new(e.into()))
}

fn order_column(sort: SortField) -> &'static str {
    match sort {
        SortField::Key => "key",
    }
}

// ============================================================================
// IEntryRepository implementation
// ============================================================================

#[async_trait::async_trait]
impl IEntryRepository for SqliteEntryRepository {
    async fn find_by_key(&self, key: &str) -> Result<Option<EntryRecord>, RepositoryError> {
        let row = sqlx::query("SELECT key, identity, payload, audits FROM entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        match row {
            Some(ref r) => Ok(Some(entry_from_row(r).map_err(backend)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, record: &EntryRecord) -> Result<EntryRecord, RepositoryError> {
        let audits = audits_to_json(record.audits()).map_err(backend)?;

        let result = sqlx::query(
            "INSERT INTO entries (key, identity, payload, audits) VALUES (?, ?, ?, ?)",
        )
        .bind(record.key())
        .bind(record.identity())
        .bind(record.payload())
        .bind(&audits)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                tracing::trace!(key = %record.key(), "Saved entry");
                Ok(record.clone())
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                tracing::debug!(key = %record.key(), "Unique constraint rejected entry");
                Err(RepositoryError::DuplicateKey(record.key().to_string()))
            }
            Err(e) => Err(backend(e)),
        }
    }

    async fn delete(&self, record: &EntryRecord) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM entries WHERE key = ?")
            .bind(record.key())
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        tracing::trace!(key = %record.key(), "Deleted entry");
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<EntryRecord>, RepositoryError> {
        let rows = sqlx::query("SELECT key, identity, payload, audits FROM entries ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            entries.push(entry_from_row(row).map_err(backend)?);
        }
        Ok(entries)
    }

    async fn find_all_paged(
        &self,
        page_number: u32,
        page_size: u32,
        sort: SortField,
    ) -> Result<Page<EntryRecord>, RepositoryError> {
        let total = self.count().await.map_err(backend)?;

        let sql = format!(
            "SELECT key, identity, payload, audits FROM entries ORDER BY {} ASC LIMIT ? OFFSET ?",
            order_column(sort)
        );
        // SQLite offsets are i64; anything past that is past the end.
        let Some(offset) = i64::from(page_number).checked_mul(i64::from(page_size)) else {
            tracing::debug!(page_number, page_size, "Page offset out of range");
            return Ok(Page::new(Vec::new(), total, page_size));
        };
        let rows = sqlx::query(&sql)
            .bind(i64::from(page_size))
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        let mut content = Vec::with_capacity(rows.len());
        for row in &rows {
            content.push(entry_from_row(row).map_err(backend)?);
        }
        Ok(Page::new(content, total, page_size))
    }
}
