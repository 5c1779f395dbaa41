//! Use cases (interactors) for the entry store
//!
//! This module contains the application use cases that orchestrate
//! domain entities and port interfaces. Use cases are thin coordinators
//! that delegate business rules to domain methods and I/O to ports.
//!
//! ## Use Cases
//!
//! - [`EntryStore`] - Audited add/get/update/delete/list over a repository
//! - [`CachedEntryStore`] - Read-through cache with eviction on every mutation
//! - [`EntryRequestHandler`] - Input validation and error-code responses

pub mod cached_store;
pub mod entry_store;
pub mod request;

#[cfg(test)]
pub(crate) mod testing;

pub use cached_store::{CacheStats, CachedEntryStore, ENTRIES_NAMESPACE};
pub use entry_store::{EntryStore, StoreError};
pub use request::{
    EntriesResponse, EntryAction, EntryActionInput, EntryActionInputBuilder, EntryInput,
    EntryRequest, EntryRequestHandler, EntryResponse, ErrorBody,
};
