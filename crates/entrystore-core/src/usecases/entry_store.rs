//! Entry store use case
//!
//! CRUD engine over the [`IEntryRepository`] port. Every mutation stamps the
//! affected record's audit trail before the single persist call that carries
//! it, and every operation resolves to an [`EntryOutcome`] instead of
//! propagating backend errors.
//!
//! ## Update protocol
//!
//! The repository's identity column is the mutable `key`, so an update
//! deletes the old row and inserts the changed record. Readers running
//! between the two calls observe the key as absent; if the insert fails the
//! old row stays deleted. Both are accepted properties of this store.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::domain::{AuditAction, DomainError, EntryOutcome, EntryRecord, PagedResult};
use crate::ports::{IEntryRepository, RepositoryError, SortField};

/// Errors returned by the listing operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The request was rejected before reaching the backend
    #[error(transparent)]
    Invalid(#[from] DomainError),

    /// The persistence backend failed
    #[error("Entry store unavailable: {0}")]
    Unavailable(String),
}

/// CRUD engine implementing the store's add/get/update/delete/list contract
///
/// Holds no state of its own beyond the repository handle; correctness of
/// concurrent writers on the same key rests on the backend's per-call
/// atomicity and unique key.
pub struct EntryStore {
    repository: Arc<dyn IEntryRepository>,
}

impl EntryStore {
    /// Creates a new EntryStore over the given repository
    pub fn new(repository: Arc<dyn IEntryRepository>) -> Self {
        Self { repository }
    }

    /// Adds `record` unless an entry with the same key already exists
    ///
    /// The record's trail (created if empty) gains an ADD event before it is
    /// persisted. The existence pre-check is only an early exit; a concurrent
    /// add that slips past it is rejected by the backend and reported as
    /// `Conflict` as well.
    pub async fn add(&self, record: EntryRecord) -> EntryOutcome {
        debug!(key = %record.key(), "Adding entry");

        if record.key().trim().is_empty() {
            return EntryOutcome::Invalid("entry key must not be empty".to_string());
        }

        match self.get(&record).await {
            EntryOutcome::Ok(_) => {
                debug!(key = %record.key(), "Entry already exists");
                return EntryOutcome::Conflict;
            }
            EntryOutcome::Unavailable(message) => return EntryOutcome::Unavailable(message),
            _ => {}
        }

        let mut record = record;
        record.record_audit(AuditAction::Add);

        let outcome = match self.repository.save(&record).await {
            Ok(saved) => EntryOutcome::Ok(saved),
            Err(RepositoryError::DuplicateKey(key)) => {
                warn!(key = %key, "Backend rejected duplicate key during add");
                EntryOutcome::Conflict
            }
            Err(e) => {
                error!(key = %record.key(), error = %e, "Error saving entry during add");
                EntryOutcome::Unavailable(e.to_string())
            }
        };

        debug!(key = %record.key(), success = outcome.is_success(), "Add finished");
        outcome
    }

    /// Looks up the entry stored under `lookup.key()`
    ///
    /// A blank key is never looked up and yields `NotFound`.
    pub async fn get(&self, lookup: &EntryRecord) -> EntryOutcome {
        if lookup.key().trim().is_empty() {
            return EntryOutcome::NotFound;
        }

        match self.repository.find_by_key(lookup.key()).await {
            Ok(Some(record)) => EntryOutcome::Ok(record),
            Ok(None) => EntryOutcome::NotFound,
            Err(e) => {
                error!(key = %lookup.key(), error = %e, "Error reading entry");
                EntryOutcome::Unavailable(e.to_string())
            }
        }
    }

    /// Deletes the stored entry matching `record`'s key and identity
    ///
    /// The returned record is the stored one, carrying its full trail
    /// including the final DELETE event.
    pub async fn delete(&self, record: &EntryRecord) -> EntryOutcome {
        debug!(key = %record.key(), "Deleting entry");

        let mut stored = match self.resolve(record.key(), record.identity()).await {
            Ok(stored) => stored,
            Err(outcome) => return outcome,
        };

        stored.record_audit(AuditAction::Delete);

        let outcome = match self.repository.delete(&stored).await {
            Ok(()) => EntryOutcome::Ok(stored),
            Err(e) => {
                error!(key = %record.key(), error = %e, "Error deleting entry during delete");
                EntryOutcome::Unavailable(e.to_string())
            }
        };

        debug!(key = %record.key(), success = outcome.is_success(), "Delete finished");
        outcome
    }

    /// Replaces the entry stored under `old_key` with `new_record`'s key and payload
    ///
    /// The stored entry must carry `new_record`'s identity. Its row is
    /// deleted, the record is re-keyed, given the new payload and an UPDATE
    /// event, then inserted again. A key change onto a key held by another
    /// entry is rejected as `Conflict` before anything is written.
    pub async fn update(&self, old_key: &str, new_record: &EntryRecord) -> EntryOutcome {
        debug!(old_key = %old_key, new_key = %new_record.key(), "Updating entry");

        if new_record.key().trim().is_empty() {
            return EntryOutcome::Invalid("entry key must not be empty".to_string());
        }

        let mut stored = match self.resolve(old_key, new_record.identity()).await {
            Ok(stored) => stored,
            Err(outcome) => return outcome,
        };

        if new_record.key() != old_key {
            match self.repository.find_by_key(new_record.key()).await {
                Ok(Some(_)) => {
                    debug!(new_key = %new_record.key(), "Target key already taken");
                    return EntryOutcome::Conflict;
                }
                Ok(None) => {}
                Err(e) => {
                    error!(key = %new_record.key(), error = %e, "Error reading target key during update");
                    return EntryOutcome::Unavailable(e.to_string());
                }
            }
        }

        if let Err(e) = self.repository.delete(&stored).await {
            error!(key = %old_key, error = %e, "Error deleting entry during update");
            return EntryOutcome::Unavailable(e.to_string());
        }

        stored.set_key(new_record.key());
        stored.set_payload(new_record.payload());
        stored.record_audit(AuditAction::Update);

        let outcome = match self.repository.save(&stored).await {
            Ok(saved) => EntryOutcome::Ok(saved),
            Err(RepositoryError::DuplicateKey(key)) => {
                warn!(old_key = %old_key, key = %key, "Key taken concurrently; old row already removed");
                EntryOutcome::Conflict
            }
            Err(e) => {
                error!(old_key = %old_key, key = %stored.key(), error = %e, "Error saving entry during update; old row already removed");
                EntryOutcome::Unavailable(e.to_string())
            }
        };

        debug!(key = %new_record.key(), success = outcome.is_success(), "Update finished");
        outcome
    }

    /// Every stored entry, in backend order
    pub async fn list(&self) -> Result<Vec<EntryRecord>, StoreError> {
        debug!("Listing all entries");
        self.repository.find_all().await.map_err(|e| {
            error!(error = %e, "Error listing entries");
            StoreError::Unavailable(e.to_string())
        })
    }

    /// One page of entries sorted by key ascending
    ///
    /// A page with no content reports zero totals, even when it lies past
    /// the end of a non-empty collection.
    pub async fn list_paged(
        &self,
        page_number: u32,
        page_size: u32,
    ) -> Result<PagedResult, StoreError> {
        debug!(page_number, page_size, "Listing paged entries");

        if page_size == 0 {
            return Err(DomainError::InvalidPageRequest {
                page_number,
                page_size,
            }
            .into());
        }

        let page = self
            .repository
            .find_all_paged(page_number, page_size, SortField::Key)
            .await
            .map_err(|e| {
                error!(error = %e, page_number, page_size, "Error listing paged entries");
                StoreError::Unavailable(e.to_string())
            })?;

        if !page.has_content() {
            return Ok(PagedResult::empty());
        }

        Ok(PagedResult {
            items: page.content,
            total_count: page.total_elements,
            total_pages: page.total_pages,
        })
    }

    /// Fetches the entry under `key` and checks it belongs to `identity`
    ///
    /// An identity mismatch is reported as `NotFound`, same as absence.
    async fn resolve(&self, key: &str, identity: &str) -> Result<EntryRecord, EntryOutcome> {
        match self.get(&EntryRecord::lookup(key, identity)).await {
            EntryOutcome::Ok(stored) if stored.identity() == identity => Ok(stored),
            EntryOutcome::Ok(stored) => {
                debug!(
                    key = %key,
                    stored_identity = %stored.identity(),
                    requested_identity = %identity,
                    "Identity mismatch"
                );
                Err(EntryOutcome::NotFound)
            }
            other => Err(other),
        }
    }
}
