//! Domain entities and business logic
//!
//! This module contains the core domain types for EntryStore:
//! - Entry records and their audit trails
//! - The deterministic ordering used for listings
//! - Operation outcomes and the caller-facing error taxonomy
//! - Domain-specific error types

pub mod audit;
pub mod entry;
pub mod errors;
pub mod ordering;
pub mod outcome;

// Re-export commonly used types
pub use audit::{AuditAction, AuditEvent, AuditTrail};
pub use entry::EntryRecord;
pub use errors::DomainError;
pub use ordering::EntryOrdering;
pub use outcome::{EntryOutcome, ErrorCode, PagedResult};
