//! Configuration module for the entry store.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Every section may be omitted from the YAML file; missing sections and
/// fields take their default values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub cache: CacheConfig,
    pub paging: PagingConfig,
    pub logging: LoggingConfig,
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,
    /// Size of the connection pool.
    pub max_connections: u32,
    /// Seconds to wait on a locked database before failing.
    pub busy_timeout_secs: u64,
}

/// Read cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// When `false`, every read goes to the database.
    pub enabled: bool,
    /// Namespace holding all entry cache keys.
    pub namespace: String,
}

/// Defaults applied to listing requests that omit page parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Zero-based page returned when none is requested.
    pub default_page_number: u32,
    pub default_page_size: u32,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Emit JSON log lines instead of human-readable output.
    pub json: bool,
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/entrystore/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("entrystore")
            .join("config.yaml")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("entrystore");
        Self {
            database_path: data_dir.join("entries.db"),
            max_connections: 5,
            busy_timeout_secs: 5,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            namespace: "entries".to_string(),
        }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_number: 0,
            default_page_size: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"paging.default_page_size"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Largest accepted `paging.default_page_size`.
const MAX_PAGE_SIZE: u32 = 1000;

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- storage ---
        if self.storage.database_path.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "storage.database_path".into(),
                message: "must not be empty".into(),
            });
        }
        if self.storage.max_connections == 0 {
            errors.push(ValidationError {
                field: "storage.max_connections".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.storage.busy_timeout_secs == 0 {
            errors.push(ValidationError {
                field: "storage.busy_timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- cache ---
        if self.cache.namespace.trim().is_empty() {
            errors.push(ValidationError {
                field: "cache.namespace".into(),
                message: "must not be empty".into(),
            });
        }

        // --- paging ---
        if self.paging.default_page_size == 0 || self.paging.default_page_size > MAX_PAGE_SIZE {
            errors.push(ValidationError {
                field: "paging.default_page_size".into(),
                message: format!("must be in range 1..={MAX_PAGE_SIZE}"),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use entrystore_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .storage_database_path(PathBuf::from("/var/lib/entrystore/entries.db"))
///     .paging_default_page_size(25)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- storage ---

    pub fn storage_database_path(mut self, path: PathBuf) -> Self {
        self.config.storage.database_path = path;
        self
    }

    pub fn storage_max_connections(mut self, n: u32) -> Self {
        self.config.storage.max_connections = n;
        self
    }

    pub fn storage_busy_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.storage.busy_timeout_secs = seconds;
        self
    }

    // --- cache ---

    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.config.cache.enabled = enabled;
        self
    }

    pub fn cache_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.cache.namespace = namespace.into();
        self
    }

    // --- paging ---

    pub fn paging_default_page_number(mut self, n: u32) -> Self {
        self.config.paging.default_page_number = n;
        self
    }

    pub fn paging_default_page_size(mut self, n: u32) -> Self {
        self.config.paging.default_page_size = n;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_json(mut self, json: bool) -> Self {
        self.config.logging.json = json;
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
