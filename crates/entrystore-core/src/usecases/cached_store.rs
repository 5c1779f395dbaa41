//! Cache coherency layer over the entry store
//!
//! Reads are cache-aside: a hit never touches the store, a miss reads the
//! store and remembers the result. Every mutation evicts the whole cache
//! namespace, synchronously, both before and after the underlying write.
//!
//! Per-key invalidation would not be safe here because updates delete and
//! re-insert rows (possibly under another key), and listings embed every
//! entry. Evicting the namespace covers all of it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};

use crate::domain::{EntryOrdering, EntryOutcome, EntryRecord, PagedResult};
use crate::ports::ICacheBackend;

use super::entry_store::{EntryStore, StoreError};

/// Default cache namespace holding all entry reads
pub const ENTRIES_NAMESPACE: &str = "entries";

/// Cache key for the full listing
const ALL_KEY: &str = "all";

/// Counters describing how the cache has been used
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of reads served from the cache (0.0 when nothing was read)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Entry store wrapped with a namespace-evicting read cache
pub struct CachedEntryStore {
    store: EntryStore,
    cache: Arc<dyn ICacheBackend>,
    namespace: String,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl CachedEntryStore {
    /// Wraps `store` with `cache` using the [`ENTRIES_NAMESPACE`] namespace
    pub fn new(store: EntryStore, cache: Arc<dyn ICacheBackend>) -> Self {
        Self {
            store,
            cache,
            namespace: ENTRIES_NAMESPACE.to_string(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Uses `namespace` instead of the default one
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The wrapped store, bypassing the cache
    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    pub async fn add(&self, record: EntryRecord) -> EntryOutcome {
        if let Err(outcome) = self.evict_before("add").await {
            return outcome;
        }
        let outcome = self.store.add(record).await;
        self.evict_after("add").await;
        outcome
    }

    pub async fn update(&self, old_key: &str, new_record: &EntryRecord) -> EntryOutcome {
        if let Err(outcome) = self.evict_before("update").await {
            return outcome;
        }
        let outcome = self.store.update(old_key, new_record).await;
        self.evict_after("update").await;
        outcome
    }

    pub async fn delete(&self, record: &EntryRecord) -> EntryOutcome {
        if let Err(outcome) = self.evict_before("delete").await {
            return outcome;
        }
        let outcome = self.store.delete(record).await;
        self.evict_after("delete").await;
        outcome
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Cache-aside lookup of a single entry
    ///
    /// Found and not-found answers are both cached; backend failures are not.
    pub async fn get(&self, lookup: &EntryRecord) -> EntryOutcome {
        let cache_key = entry_cache_key(lookup.key());
        if let Some(hit) = self.lookup::<EntryOutcome>(&cache_key).await {
            return hit;
        }

        let generation = self.generation().await;
        let outcome = self.store.get(lookup).await;
        if matches!(outcome, EntryOutcome::Ok(_) | EntryOutcome::NotFound) {
            self.remember(&cache_key, &outcome, generation).await;
        }
        outcome
    }

    /// All entries in [`EntryOrdering`] order
    pub async fn list(&self) -> Result<Vec<EntryRecord>, StoreError> {
        if let Some(hit) = self.lookup::<Vec<EntryRecord>>(ALL_KEY).await {
            return Ok(hit);
        }

        let generation = self.generation().await;
        let mut entries = self.store.list().await?;
        EntryOrdering::sort(&mut entries);
        self.remember(ALL_KEY, &entries, generation).await;
        Ok(entries)
    }

    /// One page of entries sorted by key
    pub async fn list_paged(
        &self,
        page_number: u32,
        page_size: u32,
    ) -> Result<PagedResult, StoreError> {
        let cache_key = page_cache_key(page_number, page_size);
        if let Some(hit) = self.lookup::<PagedResult>(&cache_key).await {
            return Ok(hit);
        }

        let generation = self.generation().await;
        let page = self.store.list_paged(page_number, page_size).await?;
        self.remember(&cache_key, &page, generation).await;
        Ok(page)
    }

    // ========================================================================
    // Cache plumbing
    // ========================================================================

    /// Evicts before a write; a failed eviction cancels the write
    async fn evict_before(&self, operation: &str) -> Result<(), EntryOutcome> {
        match self.cache.evict_all(&self.namespace).await {
            Ok(()) => {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(namespace = %self.namespace, operation, "Evicted cache namespace");
                Ok(())
            }
            Err(e) => {
                error!(
                    namespace = %self.namespace,
                    operation,
                    error = %e,
                    "Cache eviction failed; refusing write"
                );
                Err(EntryOutcome::Unavailable(format!(
                    "cache eviction failed: {}",
                    e
                )))
            }
        }
    }

    /// Evicts after a write, dropping anything cached while it ran
    async fn evict_after(&self, operation: &str) {
        match self.cache.evict_all(&self.namespace).await {
            Ok(()) => {
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                error!(
                    namespace = %self.namespace,
                    operation,
                    error = %e,
                    "Cache eviction after write failed"
                );
            }
        }
    }

    async fn lookup<T: DeserializeOwned>(&self, cache_key: &str) -> Option<T> {
        let value = match self.cache.get(&self.namespace, cache_key).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
            Err(e) => {
                warn!(key = %cache_key, error = %e, "Cache read failed; reading store");
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        match serde_json::from_value(value) {
            Ok(hit) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %cache_key, "Cache hit");
                Some(hit)
            }
            Err(e) => {
                warn!(key = %cache_key, error = %e, "Discarding undecodable cache value");
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Namespace generation to pair with a store read
    ///
    /// Taken before the read; `None` when the backend cannot report it, in
    /// which case the result is not cached.
    async fn generation(&self) -> Option<u64> {
        match self.cache.generation(&self.namespace).await {
            Ok(generation) => Some(generation),
            Err(e) => {
                warn!(namespace = %self.namespace, error = %e, "Cache generation unavailable; not caching");
                None
            }
        }
    }

    /// Caches `value` unless the namespace was evicted after `generation`
    async fn remember<T: Serialize>(&self, cache_key: &str, value: &T, generation: Option<u64>) {
        let Some(generation) = generation else {
            return;
        };
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %cache_key, error = %e, "Failed to encode cache value");
                return;
            }
        };

        match self
            .cache
            .put(&self.namespace, cache_key, value, generation)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                debug!(key = %cache_key, generation, "Cache declined value");
            }
            Err(e) => {
                warn!(key = %cache_key, error = %e, "Cache write failed");
            }
        }
    }
}

/// Cache key for a single-entry lookup
///
/// The prefix keeps an entry literally named "all" apart from listings.
fn entry_cache_key(key: &str) -> String {
    format!("entry:{}", key)
}

fn page_cache_key(page_number: u32, page_size: u32) -> String {
    format!("{}:{}:{}", ALL_KEY, page_number, page_size)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering as AtomicOrdering;

    use super::*;
    use crate::domain::AuditAction;
    use crate::usecases::testing::{MockCache, MockRepository};

    fn setup() -> (Arc<MockRepository>, Arc<MockCache>, CachedEntryStore) {
        let repo = Arc::new(MockRepository::new());
        let cache = Arc::new(MockCache::new());
        let store = CachedEntryStore::new(EntryStore::new(repo.clone()), cache.clone());
        (repo, cache, store)
    }

    #[tokio::test]
    async fn test_get_hit_skips_store() {
        let (repo, _cache, store) = setup();
        repo.seed(EntryRecord::new("k", "id", "v"));

        let first = store.get(&EntryRecord::lookup("k", "id")).await;
        let second = store.get(&EntryRecord::lookup("k", "id")).await;

        assert_eq!(first, second);
        assert_eq!(repo.find_calls.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(store.stats().hits, 1);
        assert_eq!(store.stats().misses, 1);
        assert!((store.stats().hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_cache_keys_are_namespaced_and_prefixed() {
        let (repo, cache, store) = setup();
        repo.seed(EntryRecord::new("all", "id", "v"));

        store.get(&EntryRecord::lookup("all", "id")).await;
        store.list().await.unwrap();
        store.list_paged(1, 5).await.unwrap();

        assert!(cache.contains(ENTRIES_NAMESPACE, "entry:all"));
        assert!(cache.contains(ENTRIES_NAMESPACE, "all"));
        assert!(cache.contains(ENTRIES_NAMESPACE, "all:1:5"));
    }

    #[tokio::test]
    async fn test_get_after_add_is_not_stale() {
        let (_repo, _cache, store) = setup();

        // Cache a not-found answer first.
        assert_eq!(
            store.get(&EntryRecord::lookup("k", "id")).await,
            EntryOutcome::NotFound
        );

        assert!(store.add(EntryRecord::new("k", "id", "v1")).await.is_success());
        let after = store.get(&EntryRecord::lookup("k", "id")).await;
        assert_eq!(after.record().unwrap().payload(), "v1");
    }

    #[tokio::test]
    async fn test_get_after_update_and_delete_is_not_stale() {
        let (_repo, _cache, store) = setup();
        store.add(EntryRecord::new("k", "id", "v1")).await;
        store.get(&EntryRecord::lookup("k", "id")).await;

        store.update("k", &EntryRecord::new("k", "id", "v2")).await;
        let updated = store.get(&EntryRecord::lookup("k", "id")).await;
        assert_eq!(updated.record().unwrap().payload(), "v2");
        assert_eq!(
            updated.record().unwrap().audits().actions(),
            vec![AuditAction::Add, AuditAction::Update]
        );

        store.delete(&EntryRecord::lookup("k", "id")).await;
        assert_eq!(
            store.get(&EntryRecord::lookup("k", "id")).await,
            EntryOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_list_after_mutation_is_not_stale() {
        let (_repo, _cache, store) = setup();
        store.add(EntryRecord::new("b", "1", "")).await;
        assert_eq!(store.list().await.unwrap().len(), 1);

        store.add(EntryRecord::new("a", "2", "")).await;
        store.add(EntryRecord::new("c", "3", "")).await;

        let keys: Vec<String> = store
            .list()
            .await
            .unwrap()
            .iter()
            .map(|e| e.key().to_string())
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_list_is_sorted_and_cached() {
        let (repo, _cache, store) = setup();
        for key in ["b", "a", "c"] {
            repo.seed(EntryRecord::new(key, key, ""));
        }

        let first = store.list().await.unwrap();
        let keys: Vec<&str> = first.iter().map(|e| e.key()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);

        store.list().await.unwrap();
        assert_eq!(repo.find_all_calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_eviction_happens_even_when_mutation_fails() {
        let (_repo, cache, store) = setup();
        store.get(&EntryRecord::lookup("missing", "id")).await;
        assert_eq!(cache.len(), 1);

        let outcome = store.delete(&EntryRecord::lookup("missing", "id")).await;
        assert_eq!(outcome, EntryOutcome::NotFound);
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.evictions.load(AtomicOrdering::SeqCst), 2);
        assert_eq!(store.stats().evictions, 2);
    }

    #[tokio::test]
    async fn test_failed_eviction_refuses_write() {
        let (repo, cache, store) = setup();
        cache.fail_evictions.store(true, AtomicOrdering::SeqCst);

        let outcome = store.add(EntryRecord::new("k", "id", "v")).await;
        assert!(matches!(outcome, EntryOutcome::Unavailable(_)));
        assert_eq!(repo.len(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_is_not_cached() {
        let (repo, cache, store) = setup();
        repo.seed(EntryRecord::new("k", "id", "v"));
        repo.fail_reads.store(true, AtomicOrdering::SeqCst);

        let outcome = store.get(&EntryRecord::lookup("k", "id")).await;
        assert!(matches!(outcome, EntryOutcome::Unavailable(_)));
        assert_eq!(cache.len(), 0);

        repo.fail_reads.store(false, AtomicOrdering::SeqCst);
        assert!(store.get(&EntryRecord::lookup("k", "id")).await.is_success());
    }

    #[tokio::test]
    async fn test_cache_read_failure_falls_back_to_store() {
        let (repo, cache, store) = setup();
        repo.seed(EntryRecord::new("k", "id", "v"));
        cache.fail_reads.store(true, AtomicOrdering::SeqCst);

        assert!(store.get(&EntryRecord::lookup("k", "id")).await.is_success());
        assert!(store.get(&EntryRecord::lookup("k", "id")).await.is_success());
        assert_eq!(repo.find_calls.load(AtomicOrdering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_paged_results_cached_per_page() {
        let (repo, _cache, store) = setup();
        for i in 0..25 {
            repo.seed(EntryRecord::new(format!("k{:02}", i), "id", ""));
        }

        let first = store.list_paged(0, 10).await.unwrap();
        let third = store.list_paged(2, 10).await.unwrap();
        assert_eq!(first.items.len(), 10);
        assert_eq!(third.items.len(), 5);
        assert_eq!(first.total_pages, 3);

        store.list_paged(0, 10).await.unwrap();
        assert_eq!(repo.find_all_calls.load(AtomicOrdering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_read_overtaken_by_eviction_is_not_cached() {
        let (repo, cache, store) = setup();
        repo.seed(EntryRecord::new("k", "id", "v1"));

        let generation = store.generation().await;
        store.add(EntryRecord::new("other", "id", "")).await;
        store.remember("entry:k", &"stale", generation).await;

        assert!(!cache.contains(ENTRIES_NAMESPACE, "entry:k"));
        let fresh = store.get(&EntryRecord::lookup("k", "id")).await;
        assert_eq!(fresh.record().unwrap().payload(), "v1");
        assert!(cache.contains(ENTRIES_NAMESPACE, "entry:k"));
    }

    #[tokio::test]
    async fn test_custom_namespace() {
        let (repo, cache, _) = setup();
        let store = CachedEntryStore::new(EntryStore::new(repo.clone()), cache.clone())
            .with_namespace("tenant-a");
        repo.seed(EntryRecord::new("k", "id", "v"));

        store.get(&EntryRecord::lookup("k", "id")).await;
        assert_eq!(store.namespace(), "tenant-a");
        assert!(cache.contains("tenant-a", "entry:k"));
    }
}
