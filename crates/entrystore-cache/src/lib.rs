//! EntryStore Cache - In-process read cache
//!
//! Driven adapters for the `ICacheBackend` port:
//!
//! - [`NamespaceCache`] - `DashMap`-backed cache with per-namespace generations
//! - [`DisabledCache`] - Backend that never retains anything
//!
//! ## Invalidation
//!
//! Every namespace carries a generation number that is part of each stored
//! key. `evict_all` bumps the generation first, so lookups stop seeing the
//! old values as soon as it returns, and only then sweeps the stale values
//! out of the map.

pub mod disabled;
pub mod namespace;

pub use disabled::DisabledCache;
pub use namespace::NamespaceCache;

/// Errors reported by the cache adapters
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CacheError {
    /// Namespaces must be non-blank
    #[error("Invalid cache namespace: '{0}'")]
    InvalidNamespace(String),
}
