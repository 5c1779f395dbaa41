//! Cache backend port (driven/secondary port)
//!
//! The coherency layer keeps serialized read results in a cache grouped by
//! namespace. Invalidation is always namespace-wide.
//!
//! Each namespace carries a generation that `evict_all` advances. Readers
//! take the generation before reading the store and hand it back to `put`,
//! so a value read before an eviction can never be stored after it.

use serde_json::Value;

/// Port trait for a namespaced key/value read cache
///
/// Values are JSON so a remote cache (string-valued) and an in-process map
/// can both implement the port without knowing the domain types.
#[async_trait::async_trait]
pub trait ICacheBackend: Send + Sync {
    /// Returns the value cached under `key` in `namespace`
    async fn get(&self, namespace: &str, key: &str) -> anyhow::Result<Option<Value>>;

    /// Current generation of `namespace`
    async fn generation(&self, namespace: &str) -> anyhow::Result<u64>;

    /// Stores `value` under `key` in `namespace` if `generation` is still current
    ///
    /// Returns `false` when the namespace was evicted since `generation` was
    /// taken; the value is then not visible to any later `get`.
    async fn put(
        &self,
        namespace: &str,
        key: &str,
        value: Value,
        generation: u64,
    ) -> anyhow::Result<bool>;

    /// Drops every value in `namespace`
    ///
    /// Must be visible to all subsequent `get` calls once it returns.
    async fn evict_all(&self, namespace: &str) -> anyhow::Result<()>;
}
