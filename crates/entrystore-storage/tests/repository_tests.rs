//! Integration tests for SqliteEntryRepository
//!
//! These tests verify all IEntryRepository methods using an in-memory
//! SQLite database. Each test function creates a fresh database to
//! ensure test isolation.

use std::sync::Arc;

use entrystore_core::domain::{AuditAction, EntryOutcome, EntryRecord};
use entrystore_core::ports::{IEntryRepository, RepositoryError, SortField};
use entrystore_core::usecases::EntryStore;
use entrystore_storage::{DatabasePool, SqliteEntryRepository};

// ============================================================================
// Test helpers
// ============================================================================

/// Create a fresh in-memory repository for each test
async fn setup() -> (DatabasePool, SqliteEntryRepository) {
    let pool = DatabasePool::in_memory()
        .await
        .expect("Failed to create in-memory database");
    let repo = SqliteEntryRepository::new(pool.pool().clone());
    (pool, repo)
}

fn audited(key: &str, identity: &str, payload: &str) -> EntryRecord {
    let mut record = EntryRecord::new(key, identity, payload);
    record.record_audit(AuditAction::Add);
    record
}

// ============================================================================
// Single-record operations
// ============================================================================

#[tokio::test]
async fn test_save_and_find_by_key() {
    let (_pool, repo) = setup().await;
    let record = audited("alpha", "owner-1", "first payload");

    let saved = repo.save(&record).await.unwrap();
    assert_eq!(saved, record);

    let found = repo.find_by_key("alpha").await.unwrap().unwrap();
    assert_eq!(found.key(), "alpha");
    assert_eq!(found.identity(), "owner-1");
    assert_eq!(found.payload(), "first payload");
    assert_eq!(found.audits().actions(), vec![AuditAction::Add]);
    assert_eq!(found.audits(), record.audits());
}

#[tokio::test]
async fn test_find_missing_key_is_none() {
    let (_pool, repo) = setup().await;
    assert!(repo.find_by_key("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_duplicate_key_is_rejected() {
    let (_pool, repo) = setup().await;
    repo.save(&audited("alpha", "owner-1", "v1")).await.unwrap();

    let err = repo
        .save(&audited("alpha", "owner-2", "v2"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::DuplicateKey(ref k) if k == "alpha"));

    let kept = repo.find_by_key("alpha").await.unwrap().unwrap();
    assert_eq!(kept.identity(), "owner-1");
}

#[tokio::test]
async fn test_delete_removes_row_and_tolerates_missing() {
    let (_pool, repo) = setup().await;
    let record = audited("alpha", "owner-1", "v1");
    repo.save(&record).await.unwrap();

    repo.delete(&record).await.unwrap();
    assert!(repo.find_by_key("alpha").await.unwrap().is_none());

    repo.delete(&record).await.unwrap();
    assert_eq!(repo.count().await.unwrap(), 0);
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_find_all_returns_every_row() {
    let (_pool, repo) = setup().await;
    for key in ["c", "a", "b"] {
        repo.save(&audited(key, "owner", "")).await.unwrap();
    }

    let all = repo.find_all().await.unwrap();
    let mut keys: Vec<&str> = all.iter().map(|e| e.key()).collect();
    keys.sort();
    assert_eq!(keys, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_find_all_paged_orders_by_key() {
    let (_pool, repo) = setup().await;
    for i in (0..7).rev() {
        repo.save(&audited(&format!("k{}", i), "owner", ""))
            .await
            .unwrap();
    }

    let first = repo.find_all_paged(0, 3, SortField::Key).await.unwrap();
    let keys: Vec<&str> = first.content.iter().map(|e| e.key()).collect();
    assert_eq!(keys, vec!["k0", "k1", "k2"]);
    assert_eq!(first.total_elements, 7);
    assert_eq!(first.total_pages, 3);

    let last = repo.find_all_paged(2, 3, SortField::Key).await.unwrap();
    let keys: Vec<&str> = last.content.iter().map(|e| e.key()).collect();
    assert_eq!(keys, vec!["k6"]);

    let beyond = repo.find_all_paged(5, 3, SortField::Key).await.unwrap();
    assert!(!beyond.has_content());
    assert_eq!(beyond.total_elements, 7);
}

#[tokio::test]
async fn test_find_all_paged_with_unrepresentable_offset_is_empty() {
    let (_pool, repo) = setup().await;
    repo.save(&audited("k", "owner", "")).await.unwrap();

    let page = repo
        .find_all_paged(u32::MAX, u32::MAX, SortField::Key)
        .await
        .unwrap();
    assert!(!page.has_content());
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.total_pages, 1);

    let store = EntryStore::new(Arc::new(repo));
    let listed = store.list_paged(u32::MAX, u32::MAX).await.unwrap();
    assert!(listed.items.is_empty());
    assert_eq!(listed.total_count, 0);
}

// ============================================================================
// Failure reporting
// ============================================================================

#[tokio::test]
async fn test_closed_pool_reports_backend_error() {
    let (pool, repo) = setup().await;
    pool.close().await;

    let err = repo.find_by_key("alpha").await.unwrap_err();
    assert!(matches!(err, RepositoryError::Backend(_)));

    let err = repo.save(&audited("alpha", "o", "")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Backend(_)));
}

#[tokio::test]
async fn test_corrupt_audit_column_reports_backend_error() {
    let (pool, repo) = setup().await;
    sqlx::query("INSERT INTO entries (key, identity, payload, audits) VALUES ('bad', 'o', '', 'not json')")
        .execute(pool.pool())
        .await
        .unwrap();

    let err = repo.find_by_key("bad").await.unwrap_err();
    assert!(err.to_string().contains("Failed to decode audit trail"));
}

// ============================================================================
// Store over SQLite
// ============================================================================

#[tokio::test]
async fn test_store_scenario_against_sqlite() {
    let (_pool, repo) = setup().await;
    let store = EntryStore::new(Arc::new(repo));

    let added = store.add(EntryRecord::new("k1", "id1", "v1")).await;
    assert!(added.is_success());

    let updated = store
        .update("k1", &EntryRecord::new("k2", "id1", "v2"))
        .await;
    let updated = updated.into_record().unwrap();
    assert_eq!(updated.key(), "k2");
    assert_eq!(
        updated.audits().actions(),
        vec![AuditAction::Add, AuditAction::Update]
    );

    assert_eq!(
        store.get(&EntryRecord::lookup("k1", "id1")).await,
        EntryOutcome::NotFound
    );

    let deleted = store.delete(&EntryRecord::lookup("k2", "id1")).await;
    let deleted = deleted.into_record().unwrap();
    assert_eq!(
        deleted.audits().actions(),
        vec![AuditAction::Add, AuditAction::Update, AuditAction::Delete]
    );
    let ids: Vec<u32> = deleted.audits().iter().map(|e| e.sequence_id()).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_store_add_conflict_against_sqlite() {
    let (_pool, repo) = setup().await;
    let store = EntryStore::new(Arc::new(repo));

    store.add(EntryRecord::new("k", "a", "x")).await;
    assert_eq!(
        store.add(EntryRecord::new("k", "b", "y")).await,
        EntryOutcome::Conflict
    );
}

#[tokio::test]
async fn test_file_database_persists_across_pools() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entries.db");

    {
        let pool = DatabasePool::new(&path).await.unwrap();
        let repo = SqliteEntryRepository::new(pool.pool().clone());
        repo.save(&audited("durable", "owner", "kept")).await.unwrap();
        pool.close().await;
    }

    let pool = DatabasePool::new(&path).await.unwrap();
    let repo = SqliteEntryRepository::new(pool.pool().clone());
    let found = repo.find_by_key("durable").await.unwrap().unwrap();
    assert_eq!(found.payload(), "kept");
    assert_eq!(found.audits().len(), 1);
}
