//! Atomic multi-write ledger transactions.
//!
//! A [`LedgerTransaction`] buffers puts and deletes and appends all of them
//! under a single [`TxId`] on [`commit`](LedgerTransaction::commit). Either
//! every buffered write becomes a new version, or none does.
//!
//! # Example
//!
//! ```
//! use vehicle_ledger_storage::{HistoryIterator, LedgerTransaction, MemoryLedger, VersionedStore};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let ledger = MemoryLedger::new();
//!
//! let mut txn = ledger.transaction().await.unwrap();
//! txn.put(b"registration_KA01".to_vec(), b"{}".to_vec());
//! txn.put(b"service_KA01".to_vec(), b"{}".to_vec());
//! let tx_id = txn.commit().await.unwrap();
//!
//! let mut cursor = ledger.history(b"service_KA01").await.unwrap();
//! let version = cursor.next().await.unwrap().unwrap();
//! assert_eq!(version.tx_id, tx_id);
//! cursor.close();
//! # });
//! ```

use async_trait::async_trait;
use bytes::Bytes;

use crate::{error::StorageResult, types::TxId};

/// Buffered, all-or-nothing set of ledger writes.
///
/// Reads through [`get`](LedgerTransaction::get) see the transaction's own
/// pending writes first. Dropping a transaction without committing discards
/// every buffered write.
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Reads the latest value of a key, honoring pending writes.
    ///
    /// A key read from the ledger joins the transaction's read set: if it
    /// gains a version before [`commit`](LedgerTransaction::commit), the
    /// commit is rejected.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(bytes))` if the key has a live value
    /// - `Ok(None)` if the key was never written, its latest version is a
    ///   tombstone, or it was deleted earlier in this transaction
    /// - `Err(...)` on storage errors
    async fn get(&self, key: &[u8]) -> StorageResult<Option<Bytes>>;

    /// Buffers a new version for `key`.
    fn put(&mut self, key: Vec<u8>, value: Vec<u8>);

    /// Buffers a tombstone for `key`.
    fn delete(&mut self, key: Vec<u8>);

    /// Number of distinct keys with a pending write.
    fn pending(&self) -> usize;

    /// Appends every buffered write atomically under one transaction id.
    ///
    /// # Errors
    ///
    /// - [`StorageError::SizeLimitExceeded`](crate::StorageError::SizeLimitExceeded) if any
    ///   buffered write is too large; nothing is committed
    /// - [`StorageError::Conflict`](crate::StorageError::Conflict) if a key in the read set
    ///   changed since it was read; nothing is committed
    /// - Other [`StorageError`](crate::StorageError) variants on substrate failures
    async fn commit(self: Box<Self>) -> StorageResult<TxId>;
}
