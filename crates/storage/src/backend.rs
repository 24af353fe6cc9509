//! Versioned store trait definition.
//!
//! [`VersionedStore`] is the contract the vehicle record core requires from
//! the ledger substrate. The substrate owns consensus, ordering and
//! persistence; this trait only names what the core reads and writes.
//!
//! # Design Philosophy
//!
//! - **Append-only**: every `put` or `delete` appends a version to the key's
//!   chain. Nothing is ever overwritten or erased.
//! - **Latest-value reads**: `get` sees the newest version only. A tombstone
//!   as newest version reads as absent.
//! - **Ordered history**: `history` yields the full chain in commit order.
//! - **Bytes in, bytes out**: no assumptions about the payload format.
//!
//! Domain logic (key derivation, record encoding) lives in the repository
//! layer built on top of this trait.
//!
//! # Implementing a Store
//!
//! 1. Implement [`VersionedStore`]
//! 2. Implement a [`HistoryIterator`] that releases its cursor on `close`
//! 3. Implement a [`LedgerTransaction`] with all-or-nothing commit
//! 4. Map substrate-specific errors to [`StorageError`](crate::StorageError)
//!
//! See [`MemoryLedger`](crate::MemoryLedger) for a reference implementation.

use async_trait::async_trait;
use bytes::Bytes;

use crate::{
    error::StorageResult, iterator::HistoryIterator, transaction::LedgerTransaction, types::TxId,
};

/// Append-only, per-key versioned key-value store.
///
/// Implementations must be thread-safe (`Send + Sync`); the trait is
/// object-safe so repositories can hold an `Arc<dyn VersionedStore>`.
///
/// # Key Operations
///
/// | Method | Description |
/// |--------|-------------|
/// | [`get`](VersionedStore::get) | Latest live value of a key |
/// | [`put`](VersionedStore::put) | Append a new version |
/// | [`delete`](VersionedStore::delete) | Append a tombstone |
/// | [`history`](VersionedStore::history) | Open a cursor over the version chain |
/// | [`transaction`](VersionedStore::transaction) | Begin an atomic multi-write |
/// | [`health_check`](VersionedStore::health_check) | Verify substrate availability |
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use vehicle_ledger_storage::{MemoryLedger, VersionedStore};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let ledger = MemoryLedger::new();
///
/// ledger.put(b"insurance_KA01".to_vec(), b"v1".to_vec()).await.unwrap();
/// ledger.put(b"insurance_KA01".to_vec(), b"v2".to_vec()).await.unwrap();
///
/// let value = ledger.get(b"insurance_KA01").await.unwrap();
/// assert_eq!(value, Some(Bytes::from("v2")));
/// # });
/// ```
#[async_trait]
pub trait VersionedStore: Send + Sync {
    /// Reads the latest version of a key.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(bytes))` if the newest version carries a payload
    /// - `Ok(None)` if the key was never written or its newest version is a
    ///   tombstone
    /// - `Err(...)` on storage errors
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn get(&self, key: &[u8]) -> StorageResult<Option<Bytes>>;

    /// Appends a new version carrying `value`.
    ///
    /// Prior versions are untouched.
    ///
    /// # Returns
    ///
    /// The id of the transaction that committed the version.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn put(&self, key: Vec<u8>, value: Vec<u8>) -> StorageResult<TxId>;

    /// Appends a tombstone version.
    ///
    /// Deleting a key that was never written, or whose newest version is
    /// already a tombstone, still appends a tombstone: the substrate records
    /// the delete as submitted.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn delete(&self, key: &[u8]) -> StorageResult<TxId>;

    /// Opens a cursor over the full version chain of `key`, oldest first.
    ///
    /// A key that was never written yields an empty cursor, not an error.
    /// The returned cursor holds a substrate resource; wrap it in a
    /// [`ScopedHistory`](crate::ScopedHistory) so it is always closed.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn history(&self, key: &[u8]) -> StorageResult<Box<dyn HistoryIterator>>;

    /// Begins a new atomic multi-write transaction.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn transaction(&self) -> StorageResult<Box<dyn LedgerTransaction>>;

    /// Verifies the substrate can serve requests.
    #[must_use = "health check results indicate substrate availability"]
    async fn health_check(&self) -> StorageResult<()>;
}
