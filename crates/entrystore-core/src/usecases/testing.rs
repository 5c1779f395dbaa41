//! In-memory port doubles shared by the use case tests

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::EntryRecord;
use crate::ports::{ICacheBackend, IEntryRepository, Page, RepositoryError, SortField};

/// Repository backed by a `BTreeMap`, with call counters and failure switches
#[derive(Default)]
pub struct MockRepository {
    rows: Mutex<BTreeMap<String, EntryRecord>>,
    pub find_calls: AtomicUsize,
    pub find_all_calls: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub fail_saves: AtomicBool,
    pub fail_deletes: AtomicBool,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row directly, bypassing the store
    pub fn seed(&self, record: EntryRecord) {
        self.rows
            .lock()
            .unwrap()
            .insert(record.key().to_string(), record);
    }

    pub fn row(&self, key: &str) -> Option<EntryRecord> {
        self.rows.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<(), RepositoryError> {
        if flag.load(Ordering::SeqCst) {
            Err(RepositoryError::Backend(anyhow::anyhow!(
                "simulated {} failure",
                what
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl IEntryRepository for MockRepository {
    async fn find_by_key(&self, key: &str) -> Result<Option<EntryRecord>, RepositoryError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_reads, "read")?;
        Ok(self.row(key))
    }

    async fn save(&self, record: &EntryRecord) -> Result<EntryRecord, RepositoryError> {
        Self::check(&self.fail_saves, "save")?;
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(record.key()) {
            return Err(RepositoryError::DuplicateKey(record.key().to_string()));
        }
        rows.insert(record.key().to_string(), record.clone());
        Ok(record.clone())
    }

    async fn delete(&self, record: &EntryRecord) -> Result<(), RepositoryError> {
        Self::check(&self.fail_deletes, "delete")?;
        self.rows.lock().unwrap().remove(record.key());
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<EntryRecord>, RepositoryError> {
        self.find_all_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_reads, "read")?;
        // Reverse key order so callers cannot rely on backend ordering.
        Ok(self.rows.lock().unwrap().values().rev().cloned().collect())
    }

    async fn find_all_paged(
        &self,
        page_number: u32,
        page_size: u32,
        sort: SortField,
    ) -> Result<Page<EntryRecord>, RepositoryError> {
        self.find_all_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_reads, "read")?;
        assert_eq!(sort, SortField::Key);
        let rows = self.rows.lock().unwrap();
        let content: Vec<EntryRecord> = rows
            .values()
            .skip(page_number as usize * page_size as usize)
            .take(page_size as usize)
            .cloned()
            .collect();
        Ok(Page::new(content, rows.len() as u64, page_size))
    }
}

/// Namespaced cache backed by a `HashMap`, with a failure switch for evictions
#[derive(Default)]
pub struct MockCache {
    values: Mutex<HashMap<(String, String), Value>>,
    generations: Mutex<HashMap<String, u64>>,
    pub evictions: AtomicUsize,
    pub fail_evictions: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl MockCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().unwrap().len()
    }

    fn current(&self, namespace: &str) -> u64 {
        self.generations
            .lock()
            .unwrap()
            .get(namespace)
            .copied()
            .unwrap_or(0)
    }

    pub fn contains(&self, namespace: &str, key: &str) -> bool {
        self.values
            .lock()
            .unwrap()
            .contains_key(&(namespace.to_string(), key.to_string()))
    }
}

#[async_trait]
impl ICacheBackend for MockCache {
    async fn get(&self, namespace: &str, key: &str) -> anyhow::Result<Option<Value>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("simulated cache read failure");
        }
        Ok(self
            .values
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }

    async fn generation(&self, namespace: &str) -> anyhow::Result<u64> {
        Ok(self.current(namespace))
    }

    async fn put(
        &self,
        namespace: &str,
        key: &str,
        value: Value,
        generation: u64,
    ) -> anyhow::Result<bool> {
        // Hold the generation lock so an eviction cannot slip in between.
        let generations = self.generations.lock().unwrap();
        if generations.get(namespace).copied().unwrap_or(0) != generation {
            return Ok(false);
        }
        self.values
            .lock()
            .unwrap()
            .insert((namespace.to_string(), key.to_string()), value);
        Ok(true)
    }

    async fn evict_all(&self, namespace: &str) -> anyhow::Result<()> {
        if self.fail_evictions.load(Ordering::SeqCst) {
            anyhow::bail!("simulated eviction failure");
        }
        self.evictions.fetch_add(1, Ordering::SeqCst);
        let mut generations = self.generations.lock().unwrap();
        *generations.entry(namespace.to_string()).or_insert(0) += 1;
        self.values
            .lock()
            .unwrap()
            .retain(|(ns, _), _| ns != namespace);
        Ok(())
    }
}
