//! Entry record domain entity
//!
//! An [`EntryRecord`] is the unit held by the store: a unique `key`, an
//! `identity` that tells apart logically different entries which may share a
//! key across update/recreate cycles, the mutable `payload`, and the record's
//! own [`AuditTrail`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::audit::{AuditAction, AuditEvent, AuditTrail};

/// A keyed, audited value held by the entry store
///
/// Equality of stored entries is by `key` only; the store enforces that at
/// most one record exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    /// Primary lookup key
    key: String,
    /// Secondary identity of the logical entry
    identity: String,
    /// Mutable value content
    #[serde(default)]
    payload: String,
    /// Audit history, empty until the first mutation
    #[serde(default)]
    audits: AuditTrail,
}

impl EntryRecord {
    /// Creates a record with an empty audit trail
    pub fn new(
        key: impl Into<String>,
        identity: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            identity: identity.into(),
            payload: payload.into(),
            audits: AuditTrail::new(),
        }
    }

    /// Creates a record used only to look up `key` (empty payload)
    pub fn lookup(key: impl Into<String>, identity: impl Into<String>) -> Self {
        Self::new(key, identity, String::new())
    }

    /// Replaces the audit trail (used when reconstructing from storage)
    pub fn with_audits(mut self, audits: AuditTrail) -> Self {
        self.audits = audits;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn audits(&self) -> &AuditTrail {
        &self.audits
    }

    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    pub fn set_payload(&mut self, payload: impl Into<String>) {
        self.payload = payload.into();
    }

    /// Returns true if `other` refers to the same logical entry
    pub fn same_identity(&self, other: &EntryRecord) -> bool {
        self.identity == other.identity
    }

    /// Appends an audit event for `action` to this record's trail
    pub fn record_audit(&mut self, action: AuditAction) -> AuditEvent {
        self.audits.record(action)
    }

    /// Timestamp of the event with the highest sequence id
    pub fn latest_audit_timestamp(&self) -> Option<DateTime<Utc>> {
        self.audits.latest().map(AuditEvent::timestamp)
    }
}
