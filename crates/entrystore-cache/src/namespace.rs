//! Namespaced in-memory cache on `DashMap`

use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, trace};

use entrystore_core::ports::ICacheBackend;

use crate::CacheError;

/// Map key: namespace, generation at write time, caller key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SlotKey {
    namespace: String,
    generation: u64,
    key: String,
}

/// Thread-safe namespaced cache
///
/// Uses DashMap for concurrent access from every request task.
#[derive(Debug, Default)]
pub struct NamespaceCache {
    /// namespace -> current generation
    generations: DashMap<String, u64>,
    values: DashMap<SlotKey, Value>,
}

impl NamespaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation of `namespace` (0 until its first eviction)
    pub fn generation(&self, namespace: &str) -> u64 {
        self.generations.get(namespace).map(|g| *g).unwrap_or(0)
    }

    /// Number of live values in `namespace`
    pub fn namespace_len(&self, namespace: &str) -> usize {
        let generation = self.generation(namespace);
        self.values
            .iter()
            .filter(|slot| slot.key().namespace == namespace && slot.key().generation == generation)
            .count()
    }

    /// Number of values held across all namespaces
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn slot(&self, namespace: &str, key: &str) -> Result<SlotKey, CacheError> {
        if namespace.trim().is_empty() {
            return Err(CacheError::InvalidNamespace(namespace.to_string()));
        }
        Ok(SlotKey {
            namespace: namespace.to_string(),
            generation: self.generation(namespace),
            key: key.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl ICacheBackend for NamespaceCache {
    async fn get(&self, namespace: &str, key: &str) -> anyhow::Result<Option<Value>> {
        let slot = self.slot(namespace, key)?;
        Ok(self.values.get(&slot).map(|v| v.value().clone()))
    }

    async fn generation(&self, namespace: &str) -> anyhow::Result<u64> {
        Ok(self.generation(namespace))
    }

    async fn put(
        &self,
        namespace: &str,
        key: &str,
        value: Value,
        generation: u64,
    ) -> anyhow::Result<bool> {
        let slot = self.slot(namespace, key)?;
        if slot.generation != generation {
            trace!(
                namespace = %namespace,
                key = %key,
                generation,
                current = slot.generation,
                "Dropped value read under an older generation"
            );
            return Ok(false);
        }

        // The slot keeps the reader's generation, so an eviction racing this
        // insert leaves the value unreachable until the next sweep.
        trace!(namespace = %namespace, key = %key, generation, "Cached value");
        self.values.insert(slot, value);
        Ok(true)
    }

    async fn evict_all(&self, namespace: &str) -> anyhow::Result<()> {
        if namespace.trim().is_empty() {
            return Err(CacheError::InvalidNamespace(namespace.to_string()).into());
        }

        let current = {
            let mut generation = self.generations.entry(namespace.to_string()).or_insert(0);
            *generation += 1;
            *generation
        };

        let before = self.values.len();
        self.values
            .retain(|slot, _| slot.namespace != namespace || slot.generation >= current);
        debug!(
            namespace = %namespace,
            generation = current,
            swept = before.saturating_sub(self.values.len()),
            "Evicted cache namespace"
        );
        Ok(())
    }
}
