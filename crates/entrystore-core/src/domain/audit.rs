//! Audit trail domain entities
//!
//! Every mutation of an entry is stamped with an immutable [`AuditEvent`].
//! Events live in the entry's [`AuditTrail`], an append-only sequence whose
//! sequence ids start at 1 and never repeat.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mutations that produce an audit event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Entry was added to the store
    Add,
    /// Entry payload (and possibly key) was replaced
    Update,
    /// Entry was removed from the store
    Delete,
}

impl AuditAction {
    /// Returns the action code exposed to API consumers ("Add", "Update", "Delete")
    pub fn code(&self) -> &'static str {
        match self {
            AuditAction::Add => "Add",
            AuditAction::Update => "Update",
            AuditAction::Delete => "Delete",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuditAction::Add => "add",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        };
        write!(f, "{}", s)
    }
}

/// A single, immutable state transition of an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Position of this event within its trail (1-based)
    sequence_id: u32,
    /// The mutation that was performed
    action: AuditAction,
    /// When the event was created (UTC)
    timestamp: DateTime<Utc>,
}

impl AuditEvent {
    /// Creates an event stamped with the current UTC time
    pub fn new(sequence_id: u32, action: AuditAction) -> Self {
        Self::at(sequence_id, action, Utc::now())
    }

    /// Creates an event with an explicit timestamp
    ///
    /// Used when reconstructing trails and in tests that need a fixed clock.
    pub fn at(sequence_id: u32, action: AuditAction, timestamp: DateTime<Utc>) -> Self {
        Self {
            sequence_id,
            action,
            timestamp,
        }
    }

    pub fn sequence_id(&self) -> u32 {
        self.sequence_id
    }

    pub fn action(&self) -> AuditAction {
        self.action
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Append-only history of audit events for one entry
///
/// The next sequence id is always derived from the events themselves, never
/// from a stored counter, so a trail read back from storage continues
/// numbering where it left off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditTrail {
    events: Vec<AuditEvent>,
}

impl AuditTrail {
    /// Creates an empty trail
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a trail from previously persisted events (kept in the given order)
    pub fn from_events(events: Vec<AuditEvent>) -> Self {
        Self { events }
    }

    /// Returns 1 + the highest sequence id in the trail, or 1 if it is empty
    pub fn next_sequence_id(&self) -> u32 {
        self.events
            .iter()
            .map(AuditEvent::sequence_id)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Appends a new event for `action` and returns a copy of it
    ///
    /// # Example
    ///
    /// ```
    /// use entrystore_core::domain::audit::{AuditAction, AuditTrail};
    ///
    /// let mut trail = AuditTrail::new();
    /// let first = trail.record(AuditAction::Add);
    /// let second = trail.record(AuditAction::Update);
    /// assert_eq!(first.sequence_id(), 1);
    /// assert_eq!(second.sequence_id(), 2);
    /// ```
    pub fn record(&mut self, action: AuditAction) -> AuditEvent {
        let event = AuditEvent::new(self.next_sequence_id(), action);
        self.events.push(event.clone());
        event
    }

    /// The event with the highest sequence id, if any
    pub fn latest(&self) -> Option<&AuditEvent> {
        self.events.iter().max_by_key(|event| event.sequence_id())
    }

    /// Events in insertion order
    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuditEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Actions in insertion order
    pub fn actions(&self) -> Vec<AuditAction> {
        self.events.iter().map(AuditEvent::action).collect()
    }
}
