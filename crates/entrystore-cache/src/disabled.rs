//! No-op cache backend used when caching is switched off

use serde_json::Value;

use entrystore_core::ports::ICacheBackend;

/// Cache backend that stores nothing; every lookup misses
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCache;

#[async_trait::async_trait]
impl ICacheBackend for DisabledCache {
    async fn get(&self, _namespace: &str, _key: &str) -> anyhow::Result<Option<Value>> {
        Ok(None)
    }

    async fn generation(&self, _namespace: &str) -> anyhow::Result<u64> {
        Ok(0)
    }

    async fn put(
        &self,
        _namespace: &str,
        _key: &str,
        _value: Value,
        _generation: u64,
    ) -> anyhow::Result<bool> {
        Ok(false)
    }

    async fn evict_all(&self, _namespace: &str) -> anyhow::Result<()> {
        Ok(())
    }
}
