//! Conformance test suite for [`VersionedStore`] implementations.
//!
//! Any substrate adapter can run these checks to confirm it honors the
//! append-only, commit-ordered contract the record core depends on.
//!
//! # Usage
//!
//! Enable the `testutil` feature and call each function with a fresh store:
//!
//! ```no_run
//! use vehicle_ledger_storage::{MemoryLedger, conformance};
//!
//! #[tokio::test]
//! async fn history_is_commit_ordered() {
//!     conformance::history_is_commit_ordered(&MemoryLedger::new()).await;
//! }
//! ```
//!
//! # Test Categories
//!
//! | Category | Contract aspect |
//! |----------|-----------------|
//! | Latest value | `get` sees the newest live version only |
//! | History | ordering, tombstones, empty chains, tx ids, timestamps |
//! | Transaction | one tx id per commit, all-or-nothing, stale reads conflict |
//! | Cursor | closed cursors refuse to advance |

use bytes::Bytes;

use crate::{StorageError, backend::VersionedStore, testutil::collect_history};

// ============================================================================
// Latest value
// ============================================================================

/// `get` on a never-written key returns `Ok(None)`.
pub async fn get_returns_none_for_missing_key<S: VersionedStore>(store: &S) {
    let result = store.get(b"never-written").await;
    assert!(matches!(result, Ok(None)), "missing key should read as None: {result:?}");
}

/// Successive `put`s make the newest value visible.
pub async fn get_returns_latest_version<S: VersionedStore>(store: &S) {
    store.put(b"k".to_vec(), b"v1".to_vec()).await.expect("put v1");
    store.put(b"k".to_vec(), b"v2".to_vec()).await.expect("put v2");
    let value = store.get(b"k").await.expect("get should succeed");
    assert_eq!(value, Some(Bytes::from("v2")));
}

/// A tombstone as newest version reads as absent.
pub async fn get_after_delete_returns_none<S: VersionedStore>(store: &S) {
    store.put(b"k".to_vec(), b"v1".to_vec()).await.expect("put");
    store.delete(b"k").await.expect("delete");
    assert_eq!(store.get(b"k").await.expect("get"), None);
}

/// Keys sharing a byte prefix keep independent chains.
pub async fn keys_are_byte_distinct<S: VersionedStore>(store: &S) {
    store.put(b"ab".to_vec(), b"short".to_vec()).await.expect("put ab");
    store.put(b"abc".to_vec(), b"long".to_vec()).await.expect("put abc");

    let short = collect_history(store, b"ab").await.expect("history ab");
    let long = collect_history(store, b"abc").await.expect("history abc");
    assert_eq!(short.len(), 1);
    assert_eq!(long.len(), 1);
    assert_eq!(short[0].value, Bytes::from("short"));
}

// ============================================================================
// History
// ============================================================================

/// History yields every version, oldest first.
pub async fn history_is_commit_ordered<S: VersionedStore>(store: &S) {
    for i in 0..5u8 {
        store.put(b"k".to_vec(), vec![b'0' + i]).await.expect("put");
    }

    let chain = collect_history(store, b"k").await.expect("history");
    let values: Vec<Bytes> = chain.into_iter().map(|v| v.value).collect();
    let expected: Vec<Bytes> =
        (0..5u8).map(|i| Bytes::copy_from_slice(&[b'0' + i])).collect();
    assert_eq!(values, expected);
}

/// History of a never-written key is empty, not an error.
pub async fn history_of_missing_key_is_empty<S: VersionedStore>(store: &S) {
    let chain = collect_history(store, b"never-written").await.expect("history");
    assert!(chain.is_empty());
}

/// Deletes appear as payload-free tombstones in place.
pub async fn history_includes_tombstones<S: VersionedStore>(store: &S) {
    store.put(b"k".to_vec(), b"v1".to_vec()).await.expect("put");
    store.delete(b"k").await.expect("delete");
    store.put(b"k".to_vec(), b"v3".to_vec()).await.expect("put");

    let chain = collect_history(store, b"k").await.expect("history");
    let flags: Vec<bool> = chain.iter().map(|v| v.is_delete).collect();
    assert_eq!(flags, vec![false, true, false]);
    assert!(chain[1].value.is_empty(), "tombstones carry no payload");
}

/// Each commit gets its own transaction id, returned by the write.
pub async fn history_tx_ids_match_writes<S: VersionedStore>(store: &S) {
    let first = store.put(b"k".to_vec(), b"v1".to_vec()).await.expect("put");
    let second = store.delete(b"k").await.expect("delete");
    assert_ne!(first, second);

    let chain = collect_history(store, b"k").await.expect("history");
    assert_eq!(chain[0].tx_id, first);
    assert_eq!(chain[1].tx_id, second);
}

/// Commit timestamps never go backwards within a chain.
pub async fn history_timestamps_non_decreasing<S: VersionedStore>(store: &S) {
    for i in 0..20u8 {
        store.put(b"k".to_vec(), vec![i]).await.expect("put");
    }
    let chain = collect_history(store, b"k").await.expect("history");
    assert!(chain.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

// ============================================================================
// Transaction
// ============================================================================

/// All writes of one commit share its transaction id.
pub async fn transaction_shares_tx_id<S: VersionedStore>(store: &S) {
    let mut txn = store.transaction().await.expect("begin");
    txn.put(b"a".to_vec(), b"1".to_vec());
    txn.delete(b"b".to_vec());
    let tx_id = txn.commit().await.expect("commit");

    let a = collect_history(store, b"a").await.expect("history a");
    let b = collect_history(store, b"b").await.expect("history b");
    assert_eq!(a[0].tx_id, tx_id);
    assert_eq!(b[0].tx_id, tx_id);
    assert!(b[0].is_delete);
}

/// Uncommitted writes never become versions.
pub async fn transaction_drop_discards<S: VersionedStore>(store: &S) {
    let mut txn = store.transaction().await.expect("begin");
    txn.put(b"k".to_vec(), b"v".to_vec());
    drop(txn);

    let chain = collect_history(store, b"k").await.expect("history");
    assert!(chain.is_empty());
}

/// A commit whose read has since gained a version is rejected as a conflict.
pub async fn transaction_stale_read_conflicts<S: VersionedStore>(store: &S) {
    store.put(b"k".to_vec(), b"v1".to_vec()).await.expect("put v1");

    let mut txn = store.transaction().await.expect("begin");
    assert!(txn.get(b"k").await.expect("txn get").is_some());
    store.delete(b"k").await.expect("concurrent delete");
    txn.delete(b"k".to_vec());

    let result = txn.commit().await;
    assert!(matches!(result, Err(StorageError::Conflict)), "got {result:?}");

    let chain = collect_history(store, b"k").await.expect("history");
    assert_eq!(chain.len(), 2);
}

// ============================================================================
// Cursor
// ============================================================================

/// A closed cursor refuses to advance.
pub async fn closed_cursor_refuses_next<S: VersionedStore>(store: &S) {
    store.put(b"k".to_vec(), b"v".to_vec()).await.expect("put");
    let mut cursor = store.history(b"k").await.expect("history");
    cursor.close();
    assert!(cursor.is_closed());
    assert!(matches!(cursor.next().await, Err(StorageError::IteratorClosed)));
}

/// Runs every check against stores produced by `make`.
pub async fn run_all<S, F>(make: F)
where
    S: VersionedStore,
    F: Fn() -> S,
{
    get_returns_none_for_missing_key(&make()).await;
    get_returns_latest_version(&make()).await;
    get_after_delete_returns_none(&make()).await;
    keys_are_byte_distinct(&make()).await;
    history_is_commit_ordered(&make()).await;
    history_of_missing_key_is_empty(&make()).await;
    history_includes_tombstones(&make()).await;
    history_tx_ids_match_writes(&make()).await;
    history_timestamps_non_decreasing(&make()).await;
    transaction_shares_tx_id(&make()).await;
    transaction_drop_discards(&make()).await;
    transaction_stale_read_conflicts(&make()).await;
    closed_cursor_refuses_next(&make()).await;
}
