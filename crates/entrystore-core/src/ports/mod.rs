//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IEntryRepository`] - Persistent storage for entry records
//! - [`ICacheBackend`] - Namespaced read cache used by the coherency layer

pub mod cache_backend;
pub mod entry_repository;

pub use cache_backend::ICacheBackend;
pub use entry_repository::{IEntryRepository, Page, RepositoryError, SortField};
