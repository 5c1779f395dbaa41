//! Wiring shared by every entry command
//!
//! Builds the adapter stack (SQLite repository, cache backend, cached store,
//! request handler) from the loaded configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use entrystore_cache::{DisabledCache, NamespaceCache};
use entrystore_core::config::Config;
use entrystore_core::ports::ICacheBackend;
use entrystore_core::usecases::{CachedEntryStore, EntryRequestHandler, EntryStore};
use entrystore_storage::{DatabasePool, SqliteEntryRepository};

/// Loads the configuration file
///
/// An explicitly given path must exist and parse; the default path falls
/// back to built-in defaults when it is missing.
pub fn load_config(path: Option<&PathBuf>) -> Result<(Config, PathBuf)> {
    match path {
        Some(path) => {
            let config = Config::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            Ok((config, path.clone()))
        }
        None => {
            let path = Config::default_path();
            Ok((Config::load_or_default(&path), path))
        }
    }
}

/// Fully wired store stack
pub struct AppContext {
    pub config: Config,
    pub handler: EntryRequestHandler,
    _pool: DatabasePool,
}

impl AppContext {
    /// Opens the configured database and builds the handler
    pub async fn open(mut config: Config, database: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = database {
            config.storage.database_path = path;
        }

        let errors = config.validate();
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::bail!("Invalid configuration: {}", messages.join("; "));
        }

        let pool = DatabasePool::from_config(&config.storage)
            .await
            .context("Failed to open database")?;

        info!(
            database = %config.storage.database_path.display(),
            cache_enabled = config.cache.enabled,
            "Entry store opened"
        );
        Ok(Self::with_pool(config, pool))
    }

    /// Builds a context over a fresh in-memory database
    #[cfg(test)]
    pub async fn in_memory(config: Config) -> Result<Self> {
        let pool = DatabasePool::in_memory()
            .await
            .context("Failed to open in-memory database")?;
        Ok(Self::with_pool(config, pool))
    }

    fn with_pool(config: Config, pool: DatabasePool) -> Self {
        let repository = Arc::new(SqliteEntryRepository::new(pool.pool().clone()));
        let cache: Arc<dyn ICacheBackend> = if config.cache.enabled {
            Arc::new(NamespaceCache::new())
        } else {
            debug!("Entry cache disabled");
            Arc::new(DisabledCache)
        };

        let store = CachedEntryStore::new(EntryStore::new(repository), cache)
            .with_namespace(config.cache.namespace.clone());
        let handler = EntryRequestHandler::new(Arc::new(store), config.paging.clone());

        Self {
            config,
            handler,
            _pool: pool,
        }
    }
}
