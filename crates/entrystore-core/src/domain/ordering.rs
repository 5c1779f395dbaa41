//! Deterministic ordering of entry collections
//!
//! Entries sort by key first; entries sharing a key fall back to the
//! timestamp of their most recent audit event (oldest first).

use std::cmp::Ordering;

use super::entry::EntryRecord;

/// Total order over [`EntryRecord`]s used for unpaged listings
pub struct EntryOrdering;

impl EntryOrdering {
    /// Compares two entries by key, then by latest audit timestamp
    ///
    /// When the keys match and either entry has no audit events, the
    /// entries compare equal.
    pub fn compare(a: &EntryRecord, b: &EntryRecord) -> Ordering {
        match a.key().cmp(b.key()) {
            Ordering::Equal => {}
            other => return other,
        }

        match (a.latest_audit_timestamp(), b.latest_audit_timestamp()) {
            (Some(first), Some(second)) => first.cmp(&second),
            _ => Ordering::Equal,
        }
    }

    /// Sorts `entries` in place (stable)
    pub fn sort(entries: &mut [EntryRecord]) {
        entries.sort_by(Self::compare);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::domain::audit::{AuditAction, AuditEvent, AuditTrail};

    fn entry_at(key: &str, identity: &str, hour: u32) -> EntryRecord {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap();
        EntryRecord::new(key, identity, "payload").with_audits(AuditTrail::from_events(vec![
            AuditEvent::at(1, AuditAction::Add, ts),
        ]))
    }

    #[test]
    fn test_sorts_by_key() {
        let mut entries = vec![
            EntryRecord::new("b", "1", ""),
            EntryRecord::new("a", "2", ""),
            EntryRecord::new("c", "3", ""),
        ];
        EntryOrdering::sort(&mut entries);

        let keys: Vec<&str> = entries.iter().map(|e| e.key()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tie_breaks_on_latest_audit() {
        let later = entry_at("same", "later", 12);
        let earlier = entry_at("same", "earlier", 8);

        assert_eq!(EntryOrdering::compare(&later, &earlier), Ordering::Greater);
        assert_eq!(EntryOrdering::compare(&earlier, &later), Ordering::Less);
    }

    #[test]
    fn test_tie_without_audits_is_equal() {
        let audited = entry_at("same", "x", 12);
        let bare = EntryRecord::new("same", "y", "");

        assert_eq!(EntryOrdering::compare(&audited, &bare), Ordering::Equal);
        assert_eq!(EntryOrdering::compare(&bare, &bare), Ordering::Equal);
    }

    #[test]
    fn test_latest_event_decides_not_first() {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let a = EntryRecord::new("k", "a", "").with_audits(AuditTrail::from_events(vec![
            AuditEvent::at(1, AuditAction::Add, base),
            AuditEvent::at(2, AuditAction::Update, base + chrono::Duration::hours(5)),
        ]));
        let b = entry_at("k", "b", 3);

        assert_eq!(EntryOrdering::compare(&a, &b), Ordering::Greater);
    }
}
