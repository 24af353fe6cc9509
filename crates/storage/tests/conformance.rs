//! Conformance test suite for `MemoryLedger`.
//!
//! Each test function corresponds to a single conformance check, providing
//! fine-grained failure reporting. The `run_all` test exercises the full
//! suite as a one-liner to verify no tests are accidentally omitted.

#![allow(clippy::expect_used, clippy::panic)]

use vehicle_ledger_storage::{
    MemoryLedger, MemoryLedgerConfig, conformance,
    testutil::{FailingStore, FailurePlan},
};

// ============================================================================
// Latest value (4 tests)
// ============================================================================

#[tokio::test]
async fn get_returns_none_for_missing_key() {
    conformance::get_returns_none_for_missing_key(&MemoryLedger::new()).await;
}

#[tokio::test]
async fn get_returns_latest_version() {
    conformance::get_returns_latest_version(&MemoryLedger::new()).await;
}

#[tokio::test]
async fn get_after_delete_returns_none() {
    conformance::get_after_delete_returns_none(&MemoryLedger::new()).await;
}

#[tokio::test]
async fn keys_are_byte_distinct() {
    conformance::keys_are_byte_distinct(&MemoryLedger::new()).await;
}

// ============================================================================
// History (5 tests)
// ============================================================================

#[tokio::test]
async fn history_is_commit_ordered() {
    conformance::history_is_commit_ordered(&MemoryLedger::new()).await;
}

#[tokio::test]
async fn history_of_missing_key_is_empty() {
    conformance::history_of_missing_key_is_empty(&MemoryLedger::new()).await;
}

#[tokio::test]
async fn history_includes_tombstones() {
    conformance::history_includes_tombstones(&MemoryLedger::new()).await;
}

#[tokio::test]
async fn history_tx_ids_match_writes() {
    conformance::history_tx_ids_match_writes(&MemoryLedger::new()).await;
}

#[tokio::test]
async fn history_timestamps_non_decreasing() {
    conformance::history_timestamps_non_decreasing(&MemoryLedger::new()).await;
}

// ============================================================================
// Transaction (3 tests)
// ============================================================================

#[tokio::test]
async fn transaction_shares_tx_id() {
    conformance::transaction_shares_tx_id(&MemoryLedger::new()).await;
}

#[tokio::test]
async fn transaction_drop_discards() {
    conformance::transaction_drop_discards(&MemoryLedger::new()).await;
}

#[tokio::test]
async fn transaction_stale_read_conflicts() {
    conformance::transaction_stale_read_conflicts(&MemoryLedger::new()).await;
}

// ============================================================================
// Cursor (1 test)
// ============================================================================

#[tokio::test]
async fn closed_cursor_refuses_next() {
    conformance::closed_cursor_refuses_next(&MemoryLedger::new()).await;
}

// ============================================================================
// Full suite
// ============================================================================

#[tokio::test]
async fn run_all_default_ledger() {
    conformance::run_all(MemoryLedger::new).await;
}

#[tokio::test]
async fn run_all_named_ledger() {
    conformance::run_all(|| {
        let config = MemoryLedgerConfig::builder().name("rto-north").build().expect("config");
        MemoryLedger::with_config(config).expect("ledger")
    })
    .await;
}

/// A wrapper with an empty failure plan must behave exactly like its inner store.
#[tokio::test]
async fn run_all_failing_store_without_failures() {
    conformance::run_all(|| {
        let store = FailingStore::new(MemoryLedger::new());
        store.set_plan(FailurePlan::default());
        store
    })
    .await;
}
