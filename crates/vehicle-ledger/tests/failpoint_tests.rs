#![allow(clippy::expect_used, clippy::panic, clippy::unwrap_used)]
//! Fail-point tests for the record layer.
//!
//! These tests require the `failpoints` feature:
//! ```bash
//! cargo test -p vehicle-ledger --features failpoints --test failpoint_tests
//! ```

use vehicle_ledger::{RecordError, testutil::memory_vehicle_ledger};
use vehicle_ledger_storage::StorageError;

#[tokio::test]
async fn commit_failure_surfaces_as_store_write() {
    let scenario = fail::FailScenario::setup();
    let (ledger, store) = memory_vehicle_ledger();
    ledger.set_reg_data("REG1", "CH1", "EN1", "01-2020").await.unwrap();

    fail::cfg("ledger-before-commit", "return").expect("failed to configure fail point");
    let err = ledger.set_reg_data("REG1", "CH2", "EN1", "01-2020").await.unwrap_err();
    fail::remove("ledger-before-commit");

    assert!(
        matches!(err, RecordError::StoreWrite { source: StorageError::Internal { .. }, .. }),
        "got {err:?}"
    );
    assert_eq!(store.version_count(b"registration_REG1"), 1);
    assert_eq!(ledger.get_reg_data("REG1").await.unwrap().chassis_number, "CH1");

    scenario.teardown();
}

#[tokio::test]
async fn commit_failure_on_delete_keeps_record_live() {
    let scenario = fail::FailScenario::setup();
    let (ledger, _) = memory_vehicle_ledger();
    ledger.set_service_data("REG1", "CH1", "EN1", "01-2020", "oil").await.unwrap();

    fail::cfg("ledger-before-commit", "return").expect("failed to configure fail point");
    let err = ledger.delete_service_data("REG1").await.unwrap_err();
    fail::remove("ledger-before-commit");

    assert!(matches!(err, RecordError::StoreWrite { .. }));
    assert!(ledger.get_service_data("REG1").await.is_ok());

    scenario.teardown();
}

#[tokio::test]
async fn history_stream_failure_returns_no_partial_history() {
    let scenario = fail::FailScenario::setup();
    let (ledger, store) = memory_vehicle_ledger();
    for details in ["a", "b", "c"] {
        ledger.set_service_data("REG1", "CH1", "EN1", "01-2020", details).await.unwrap();
    }

    // Let two versions through, then fail the stream
    fail::cfg("history-next", "2*off->return").expect("failed to configure fail point");
    let result = ledger.get_service_data_history("REG1").await;
    fail::remove("history-next");

    let err = result.unwrap_err();
    assert!(matches!(err, RecordError::HistoryRead { .. }), "got {err:?}");
    assert!(err.is_transient());
    assert_eq!(store.open_iterators(), 0, "cursor must be released on error");

    let recovered = ledger.service_history("REG1").await.unwrap();
    assert_eq!(recovered.len(), 3);

    scenario.teardown();
}
