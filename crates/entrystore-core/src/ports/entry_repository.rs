//! Entry repository port (driven/secondary port)
//!
//! This module defines the interface the entry store uses to persist
//! and query entry records.
//!
//! ## Design Notes
//!
//! - Absence is `Ok(None)`; any failure is an `Err`, so "not found" and
//!   "backend down" are never confused.
//! - `save` is an insert. The backend's unique constraint on `key` is the
//!   authoritative duplicate guard and surfaces as
//!   [`RepositoryError::DuplicateKey`].
//! - The audit trail is persisted as part of the record; there is no
//!   separate audit table to keep in step.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::EntryRecord;

/// Errors reported by repository adapters
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The backend rejected a write because the key is already taken
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Any other backend failure (connection, query, serialization)
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Field used to order paged queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Ascending by entry key
    #[default]
    Key,
}

/// One page of a backend query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page, in sort order
    pub content: Vec<T>,
    /// Number of items across all pages
    pub total_elements: u64,
    /// Number of pages of the requested size
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Builds a page, deriving `total_pages` from `page_size`
    pub fn new(content: Vec<T>, total_elements: u64, page_size: u32) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_elements.div_ceil(u64::from(page_size))
        };
        Self {
            content,
            total_elements,
            total_pages,
        }
    }

    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }
}

/// Port trait for entry persistence
///
/// ## Implementation Notes
///
/// - Each call must be atomic on its own; the store never asks for
///   multi-call transactions.
/// - `delete` of a key that is not present is not an error.
#[async_trait::async_trait]
pub trait IEntryRepository: Send + Sync {
    /// Retrieves the record stored under `key`
    async fn find_by_key(&self, key: &str) -> Result<Option<EntryRecord>, RepositoryError>;

    /// Inserts `record`, failing with `DuplicateKey` if its key is taken
    async fn save(&self, record: &EntryRecord) -> Result<EntryRecord, RepositoryError>;

    /// Removes the row stored under `record.key()`
    async fn delete(&self, record: &EntryRecord) -> Result<(), RepositoryError>;

    /// Every stored record, in backend order
    async fn find_all(&self) -> Result<Vec<EntryRecord>, RepositoryError>;

    /// One page of records ordered by `sort` ascending
    ///
    /// `page_number` is zero-based.
    async fn find_all_paged(
        &self,
        page_number: u32,
        page_size: u32,
        sort: SortField,
    ) -> Result<Page<EntryRecord>, RepositoryError>;
}
