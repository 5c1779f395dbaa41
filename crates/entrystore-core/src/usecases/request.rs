//! Entry request handling use case
//!
//! Transport-agnostic entry point for callers such as a CLI, an HTTP
//! controller or a queue listener. Requests are validated here, so malformed
//! input is answered with `NOT_VALID_FORMAT` and never reaches the store;
//! store outcomes are translated into response bodies carrying the error
//! taxonomy.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::PagingConfig;
use crate::domain::{DomainError, EntryOutcome, EntryRecord, ErrorCode};

use super::cached_store::CachedEntryStore;
use super::entry_store::StoreError;

/// Entry fields as submitted by a caller (any of them may be missing)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInput {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub identity: Option<String>,
    #[serde(default)]
    pub payload: Option<String>,
}

impl EntryInput {
    pub fn new(
        key: impl Into<String>,
        identity: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            key: Some(key.into()),
            identity: Some(identity.into()),
            payload: Some(payload.into()),
        }
    }

    /// Input for a lookup by key, with no identity or payload
    pub fn lookup(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }

    /// Converts into a lookup record; only the key is required
    fn to_lookup(&self) -> Result<EntryRecord, DomainError> {
        let key = required(&self.key, "entry.key")?;
        let identity = self.identity.clone().unwrap_or_default();
        Ok(EntryRecord::lookup(key, identity))
    }

    /// Converts into a record, requiring a non-blank key and identity
    fn to_record(&self) -> Result<EntryRecord, DomainError> {
        let key = required(&self.key, "entry.key")?;
        let identity = required(&self.identity, "entry.identity")?;
        let payload = self.payload.clone().unwrap_or_default();
        Ok(EntryRecord::new(key, identity, payload))
    }
}

/// Input for a single entry action
///
/// `key` is only used by updates, where it names the entry being replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryActionInput {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub entry: Option<EntryInput>,
}

impl EntryActionInput {
    pub fn builder() -> EntryActionInputBuilder {
        EntryActionInputBuilder::default()
    }
}

/// Builder for [`EntryActionInput`]
#[derive(Debug, Clone, Default)]
pub struct EntryActionInputBuilder {
    key: Option<String>,
    entry: Option<EntryInput>,
}

impl EntryActionInputBuilder {
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_entry(mut self, entry: EntryInput) -> Self {
        self.entry = Some(entry);
        self
    }

    pub fn build(self) -> EntryActionInput {
        EntryActionInput {
            key: self.key,
            entry: self.entry,
        }
    }
}

/// Kind of action carried by an [`EntryRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryAction {
    Add,
    Update,
    Delete,
    Get,
}

/// A self-describing request, as received from a message stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRequest {
    pub action: EntryAction,
    #[serde(default)]
    pub input: EntryActionInput,
}

/// Error details attached to unsuccessful responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub name: ErrorCode,
    pub description: String,
}

impl From<ErrorCode> for ErrorBody {
    fn from(code: ErrorCode) -> Self {
        Self {
            code: code.code().to_string(),
            name: code,
            description: code.description().to_string(),
        }
    }
}

/// Response for single-entry actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<EntryRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl EntryResponse {
    pub fn error(code: ErrorCode) -> Self {
        Self {
            entry: None,
            error: Some(code.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(|e| e.name)
    }
}

impl From<EntryOutcome> for EntryResponse {
    fn from(outcome: EntryOutcome) -> Self {
        match outcome.error_code() {
            None => Self {
                entry: outcome.into_record(),
                error: None,
            },
            Some(code) => Self::error(code),
        }
    }
}

/// Response for listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntriesResponse {
    pub entries: Vec<EntryRecord>,
    pub total_entries: u64,
    pub total_pages: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl EntriesResponse {
    pub fn error(code: ErrorCode) -> Self {
        Self {
            error: Some(code.into()),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(|e| e.name)
    }
}

/// Validates caller input and routes it through the cached store
pub struct EntryRequestHandler {
    store: Arc<CachedEntryStore>,
    paging: PagingConfig,
}

impl EntryRequestHandler {
    /// Creates a handler using `paging` for missing page parameters
    pub fn new(store: Arc<CachedEntryStore>, paging: PagingConfig) -> Self {
        Self { store, paging }
    }

    pub fn store(&self) -> &CachedEntryStore {
        &self.store
    }

    pub async fn add(&self, input: &EntryActionInput) -> EntryResponse {
        match entry_of(input) {
            Ok(record) => self.store.add(record).await.into(),
            Err(e) => invalid(e),
        }
    }

    pub async fn update(&self, input: &EntryActionInput) -> EntryResponse {
        let old_key = match required(&input.key, "key") {
            Ok(key) => key,
            Err(e) => return invalid(e),
        };
        match entry_of(input) {
            Ok(record) => self.store.update(&old_key, &record).await.into(),
            Err(e) => invalid(e),
        }
    }

    pub async fn delete(&self, input: &EntryActionInput) -> EntryResponse {
        match entry_of(input) {
            Ok(record) => self.store.delete(&record).await.into(),
            Err(e) => invalid(e),
        }
    }

    /// Looks an entry up by key; the identity may be omitted
    pub async fn get(&self, input: &EntryActionInput) -> EntryResponse {
        match lookup_of(input) {
            Ok(record) => self.store.get(&record).await.into(),
            Err(e) => invalid(e),
        }
    }

    /// Dispatches a request to the matching action
    pub async fn handle(&self, request: &EntryRequest) -> EntryResponse {
        debug!(action = ?request.action, "Handling entry request");
        match request.action {
            EntryAction::Add => self.add(&request.input).await,
            EntryAction::Update => self.update(&request.input).await,
            EntryAction::Delete => self.delete(&request.input).await,
            EntryAction::Get => self.get(&request.input).await,
        }
    }

    /// Parses a JSON [`EntryRequest`] and handles it
    ///
    /// Messages that cannot be parsed are logged and answered with
    /// `NOT_VALID_FORMAT`.
    pub async fn handle_message(&self, message: &str) -> EntryResponse {
        info!(message = %message, "Received entry request");
        match serde_json::from_str::<EntryRequest>(message) {
            Ok(request) => self.handle(&request).await,
            Err(e) => {
                warn!(error = %e, "Unable to parse entry request");
                EntryResponse::error(ErrorCode::NotValidFormat)
            }
        }
    }

    /// Lists entries, paged when either page parameter is given
    ///
    /// Without page parameters the full collection is returned in entry
    /// order. A missing parameter falls back to the configured default. An
    /// empty listing is reported as `NOT_FOUND`.
    pub async fn list_entries(
        &self,
        page_number: Option<u32>,
        page_size: Option<u32>,
    ) -> EntriesResponse {
        let result = match (page_number, page_size) {
            (None, None) => self.store.list().await.map(|entries| {
                let total = entries.len() as u64;
                EntriesResponse {
                    entries,
                    total_entries: total,
                    total_pages: u64::from(total > 0),
                    error: None,
                }
            }),
            (number, size) => {
                let number = number.unwrap_or(self.paging.default_page_number);
                let size = size.unwrap_or(self.paging.default_page_size);
                self.store
                    .list_paged(number, size)
                    .await
                    .map(|page| EntriesResponse {
                        entries: page.items,
                        total_entries: page.total_count,
                        total_pages: page.total_pages,
                        error: None,
                    })
            }
        };

        match result {
            Ok(response) if response.entries.is_empty() => {
                EntriesResponse::error(ErrorCode::NotFound)
            }
            Ok(response) => response,
            Err(StoreError::Invalid(e)) => {
                debug!(error = %e, "Rejected listing request");
                EntriesResponse::error(ErrorCode::NotValidFormat)
            }
            Err(StoreError::Unavailable(_)) => {
                EntriesResponse::error(ErrorCode::BackendUnavailable)
            }
        }
    }
}

fn required(value: &Option<String>, field: &str) -> Result<String, DomainError> {
    match value {
        None => Err(DomainError::MissingField(field.to_string())),
        Some(v) if v.trim().is_empty() => Err(DomainError::EmptyField(field.to_string())),
        Some(v) => Ok(v.clone()),
    }
}

fn entry_input(input: &EntryActionInput) -> Result<&EntryInput, DomainError> {
    input
        .entry
        .as_ref()
        .ok_or_else(|| DomainError::MissingField("entry".to_string()))
}

fn entry_of(input: &EntryActionInput) -> Result<EntryRecord, DomainError> {
    entry_input(input)?.to_record()
}

fn lookup_of(input: &EntryActionInput) -> Result<EntryRecord, DomainError> {
    entry_input(input)?.to_lookup()
}

fn invalid(error: DomainError) -> EntryResponse {
    debug!(error = %error, "Rejected entry request");
    EntryResponse::error(ErrorCode::NotValidFormat)
}
