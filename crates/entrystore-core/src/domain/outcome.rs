//! Operation results returned by the entry store
//!
//! Store operations never raise: every call resolves to an [`EntryOutcome`]
//! that callers match on. [`ErrorCode`] is the taxonomy exposed to API
//! consumers for the unsuccessful variants.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::entry::EntryRecord;

/// Result of a single-entry store operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum EntryOutcome {
    /// The operation succeeded; carries the resulting record
    Ok(EntryRecord),
    /// An entry with the same key already exists
    Conflict,
    /// No entry matched the key (or the identity did not match)
    NotFound,
    /// The request was malformed and never reached the store
    Invalid(String),
    /// The persistence backend failed; the message is for logs only
    Unavailable(String),
}

impl EntryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, EntryOutcome::Ok(_))
    }

    /// The record carried by a successful outcome
    pub fn record(&self) -> Option<&EntryRecord> {
        match self {
            EntryOutcome::Ok(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<EntryRecord> {
        match self {
            EntryOutcome::Ok(record) => Some(record),
            _ => None,
        }
    }

    /// Error code for unsuccessful outcomes
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            EntryOutcome::Ok(_) => None,
            EntryOutcome::Conflict => Some(ErrorCode::AlreadyExists),
            EntryOutcome::NotFound => Some(ErrorCode::NotFound),
            EntryOutcome::Invalid(_) => Some(ErrorCode::NotValidFormat),
            EntryOutcome::Unavailable(_) => Some(ErrorCode::BackendUnavailable),
        }
    }
}

/// Error taxonomy surfaced to callers of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    AlreadyExists,
    NotFound,
    NotValidFormat,
    BackendUnavailable,
}

impl ErrorCode {
    /// Stable numeric code string
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::AlreadyExists => "1",
            ErrorCode::NotFound => "2",
            ErrorCode::NotValidFormat => "3",
            ErrorCode::BackendUnavailable => "4",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::AlreadyExists => "Entry already exists.",
            ErrorCode::NotFound => "Entry could not be found.",
            ErrorCode::NotValidFormat => "Entry not submitted in a valid format.",
            ErrorCode::BackendUnavailable => "Entry store is temporarily unavailable.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::AlreadyExists => "ALREADY_EXISTS",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::NotValidFormat => "NOT_VALID_FORMAT",
            ErrorCode::BackendUnavailable => "BACKEND_UNAVAILABLE",
        };
        write!(f, "{}", s)
    }
}

/// One page of entries plus totals for the whole collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedResult {
    pub items: Vec<EntryRecord>,
    pub total_count: u64,
    pub total_pages: u64,
}

impl PagedResult {
    /// A page with no items and zero totals
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
