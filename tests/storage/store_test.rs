// Store Tests
// Tests for the sled-backed and in-memory submission stores

use chrono::{Duration, TimeZone, Utc};
use ledger_gateway::storage::{
    MemorySubmissionStore, SledSubmissionStore, StoreError, SubmissionRecord, SubmissionStatus,
    SubmissionStore,
};
use tempfile::TempDir;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn record(id: &str, source: &str, minute: i64) -> SubmissionRecord {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::minutes(minute);
    SubmissionRecord::sending(id, source, at, format!("envelope-{}", id))
}

// ============================================================================
// RECORD LIFECYCLE
// ============================================================================

#[test]
fn test_record_starts_sending() {
    let record = record("aa", "GSRC", 0);

    assert_eq!(record.status(), SubmissionStatus::Sending);
    assert!(!record.status().is_terminal());
    assert!(record.ledger().is_none());
    assert!(record.succeeded_at().is_none());
    assert!(record.result_xdr().is_none());
}

#[test]
fn test_record_mark_succeeded() {
    let mut record = record("aa", "GSRC", 0);
    let at = record.submitted_at() + Duration::seconds(5);

    record.mark_succeeded(1234, at);

    assert_eq!(record.status(), SubmissionStatus::Succeeded);
    assert!(record.status().is_terminal());
    assert_eq!(record.ledger(), Some(1234));
    assert_eq!(record.succeeded_at(), Some(at));
}

#[test]
fn test_record_mark_failed() {
    let mut record = record("aa", "GSRC", 0);

    record.mark_failed("AAAAAAAAAAD////7AAAAAA==");

    assert_eq!(record.status(), SubmissionStatus::Failed);
    assert_eq!(record.result_xdr(), Some("AAAAAAAAAAD////7AAAAAA=="));
    assert!(record.ledger().is_none());
}

#[test]
fn test_status_display() {
    assert_eq!(SubmissionStatus::Sending.to_string(), "sending");
    assert_eq!(SubmissionStatus::Succeeded.to_string(), "success");
    assert_eq!(SubmissionStatus::Failed.to_string(), "failure");
}

// ============================================================================
// SLED STORE
// ============================================================================

#[test]
fn test_sled_get_missing() {
    let temp_dir = TempDir::new().unwrap();
    let store = SledSubmissionStore::open(temp_dir.path()).unwrap();

    assert_eq!(store.get("nope").unwrap(), None);
}

/// Test: Persisting the same record twice leaves one equal record
#[test]
fn test_sled_persist_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let store = SledSubmissionStore::open(temp_dir.path()).unwrap();
    let record = record("aa", "GSRC", 0);

    store.persist(&record).unwrap();
    store.persist(&record).unwrap();

    assert_eq!(store.get("aa").unwrap(), Some(record));
    assert_eq!(store.stats().record_count, 1);
}

/// Test: Terminal record replaces the sending record
#[test]
fn test_sled_persist_updates() {
    let temp_dir = TempDir::new().unwrap();
    let store = SledSubmissionStore::open(temp_dir.path()).unwrap();
    let mut record = record("aa", "GSRC", 0);

    store.persist(&record).unwrap();
    record.mark_succeeded(99, Utc::now());
    store.persist(&record).unwrap();

    let stored = store.get("aa").unwrap().unwrap();
    assert_eq!(stored.status(), SubmissionStatus::Succeeded);
    assert_eq!(stored.ledger(), Some(99));
    assert_eq!(store.stats().record_count, 1);
}

#[test]
fn test_sled_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let record = record("aa", "GSRC", 0);

    {
        let store = SledSubmissionStore::open(temp_dir.path()).unwrap();
        store.persist(&record).unwrap();
        store.flush().unwrap();
    }

    {
        let store = SledSubmissionStore::open(temp_dir.path()).unwrap();
        assert_eq!(store.get("aa").unwrap(), Some(record));
    }
}

#[test]
fn test_sled_list_by_source_ordered() {
    let temp_dir = TempDir::new().unwrap();
    let store = SledSubmissionStore::open(temp_dir.path()).unwrap();

    store.persist(&record("cc", "GONE", 2)).unwrap();
    store.persist(&record("aa", "GONE", 5)).unwrap();
    store.persist(&record("bb", "GTWO", 1)).unwrap();
    store.persist(&record("dd", "GONE", 0)).unwrap();

    let ids: Vec<_> = store
        .list_by_source("GONE")
        .unwrap()
        .iter()
        .map(|r| r.transaction_id().to_string())
        .collect();

    assert_eq!(ids, vec!["dd", "cc", "aa"]);
    assert!(store.list_by_source("GNONE").unwrap().is_empty());
}

// ============================================================================
// MEMORY STORE
// ============================================================================

#[test]
fn test_memory_journal_keeps_every_write() {
    let store = MemorySubmissionStore::new();
    let mut record = record("aa", "GSRC", 0);

    store.persist(&record).unwrap();
    record.mark_failed("xdr");
    store.persist(&record).unwrap();

    let journal = store.journal();
    assert_eq!(journal.len(), 2);
    assert_eq!(journal[0].status(), SubmissionStatus::Sending);
    assert_eq!(journal[1].status(), SubmissionStatus::Failed);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_memory_failing_store() {
    let store = MemorySubmissionStore::failing();

    let result = store.persist(&record("aa", "GSRC", 0));

    assert!(matches!(result, Err(StoreError::DatabaseError(_))));
    assert!(store.is_empty());
    assert!(store.journal().is_empty());
}

#[test]
fn test_memory_fail_after() {
    let store = MemorySubmissionStore::new().with_fail_after(1);

    assert!(store.persist(&record("aa", "GSRC", 0)).is_ok());
    assert!(store.persist(&record("bb", "GSRC", 1)).is_err());
    assert_eq!(store.len(), 1);
}
