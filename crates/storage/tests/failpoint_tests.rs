#![allow(clippy::expect_used, clippy::panic)]
//! Integration tests for fail-point injection.
//!
//! These tests require the `failpoints` feature:
//! ```bash
//! cargo test -p vehicle-ledger-storage --features failpoints --test failpoint_tests
//! ```

use vehicle_ledger_storage::{MemoryLedger, ScopedHistory, StorageError, VersionedStore};

#[tokio::test]
async fn commit_failpoint_appends_nothing() {
    let scenario = fail::FailScenario::setup();
    fail::cfg("ledger-before-commit", "return").expect("failed to configure fail point");

    let ledger = MemoryLedger::new();
    let result = ledger.put(b"key".to_vec(), b"value".to_vec()).await;

    assert!(matches!(result, Err(StorageError::Internal { .. })), "got {result:?}");
    assert_eq!(ledger.version_count(b"key"), 0);
    assert_eq!(ledger.commit_count(), 0);

    scenario.teardown();
}

#[tokio::test]
async fn commit_failpoint_fails_whole_transaction() {
    let scenario = fail::FailScenario::setup();
    fail::cfg("ledger-before-commit", "return").expect("failed to configure fail point");

    let ledger = MemoryLedger::new();
    let mut txn = ledger.transaction().await.expect("begin");
    txn.put(b"a".to_vec(), b"1".to_vec());
    txn.delete(b"b".to_vec());
    let result = txn.commit().await;

    assert!(result.is_err(), "commit should fail when fail point is active");
    assert_eq!(ledger.version_count(b"a"), 0);
    assert_eq!(ledger.version_count(b"b"), 0);

    scenario.teardown();
}

#[tokio::test]
async fn commit_without_failpoint_succeeds() {
    let scenario = fail::FailScenario::setup();
    // No fail point configured, so the write goes through

    let ledger = MemoryLedger::new();
    let result = ledger.put(b"key".to_vec(), b"value".to_vec()).await;

    assert!(result.is_ok(), "put should succeed without fail point");
    assert_eq!(ledger.version_count(b"key"), 1);

    scenario.teardown();
}

#[tokio::test]
async fn history_failpoint_errors_and_cursor_is_released() {
    let scenario = fail::FailScenario::setup();

    let ledger = MemoryLedger::new();
    ledger.put(b"key".to_vec(), b"v1".to_vec()).await.expect("put");
    ledger.put(b"key".to_vec(), b"v2".to_vec()).await.expect("put");

    fail::cfg("history-next", "1*off->return").expect("failed to configure fail point");

    {
        let mut cursor = ScopedHistory::new(ledger.history(b"key").await.expect("open"));
        assert!(cursor.next().await.expect("first version").is_some());
        let err = cursor.next().await.expect_err("second next should fail");
        assert!(matches!(err, StorageError::Connection { .. }), "got {err:?}");
        assert!(err.is_transient());
    }

    assert_eq!(ledger.open_iterators(), 0, "cursor must be closed after the error");

    scenario.teardown();
}

#[tokio::test]
async fn health_check_failpoint_returns_error() {
    let scenario = fail::FailScenario::setup();
    fail::cfg("health-check", "return").expect("failed to configure fail point");

    let ledger = MemoryLedger::new();
    let result = ledger.health_check().await;

    assert!(result.is_err(), "health check should fail when fail point is active");

    scenario.teardown();
}

#[tokio::test]
async fn health_check_without_failpoint_succeeds() {
    let scenario = fail::FailScenario::setup();

    let ledger = MemoryLedger::new();
    let result = ledger.health_check().await;

    assert!(result.is_ok(), "health check should succeed without fail point");

    scenario.teardown();
}
