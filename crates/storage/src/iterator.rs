//! Per-key history iteration.
//!
//! [`VersionedStore::history`](crate::VersionedStore::history) hands out a
//! [`HistoryIterator`]: a cursor over one key's version chain that holds a
//! substrate resource until [`close`](HistoryIterator::close) is called.
//!
//! Callers should not hold the raw iterator. Wrap it in a [`ScopedHistory`],
//! which closes the cursor when it goes out of scope: after a normal walk, on
//! an early `?` return, or when the enclosing future is dropped mid-walk.
//!
//! # Example
//!
//! ```
//! use vehicle_ledger_storage::{MemoryLedger, ScopedHistory, VersionedStore};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let ledger = MemoryLedger::new();
//! ledger.put(b"service_KA01".to_vec(), b"{}".to_vec()).await.unwrap();
//!
//! let mut cursor = ScopedHistory::new(ledger.history(b"service_KA01").await.unwrap());
//! while let Some(version) = cursor.next().await.unwrap() {
//!     assert!(!version.is_delete);
//! }
//! drop(cursor);
//!
//! assert_eq!(ledger.open_iterators(), 0);
//! # });
//! ```

use async_trait::async_trait;

use crate::{error::StorageResult, types::KeyModification};

/// Cursor over one key's version chain, oldest version first.
///
/// Substrates yield versions in ledger-commit order. Consumers must not
/// re-sort them.
#[async_trait]
pub trait HistoryIterator: Send {
    /// Advances the cursor.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(version))` for the next version in commit order
    /// - `Ok(None)` once the chain is exhausted
    /// - `Err(...)` if the substrate failed to produce the next version, or
    ///   [`StorageError::IteratorClosed`](crate::StorageError::IteratorClosed)
    ///   if the cursor was already closed
    async fn next(&mut self) -> StorageResult<Option<KeyModification>>;

    /// Releases the substrate resource behind this cursor.
    ///
    /// Must be idempotent: closing an already closed cursor is a no-op.
    fn close(&mut self);

    /// Returns `true` once [`close`](Self::close) has run.
    fn is_closed(&self) -> bool;
}

/// Owning guard that closes a [`HistoryIterator`] when dropped.
pub struct ScopedHistory {
    inner: Box<dyn HistoryIterator>,
}

impl ScopedHistory {
    /// Takes ownership of an open cursor.
    #[must_use]
    pub fn new(inner: Box<dyn HistoryIterator>) -> Self {
        Self { inner }
    }

    /// Advances the wrapped cursor.
    pub async fn next(&mut self) -> StorageResult<Option<KeyModification>> {
        self.inner.next().await
    }

    /// Closes the cursor now instead of at end of scope.
    pub fn close(mut self) {
        self.inner.close();
    }
}

impl Drop for ScopedHistory {
    fn drop(&mut self) {
        if !self.inner.is_closed() {
            tracing::trace!("closing history iterator on scope exit");
            self.inner.close();
        }
    }
}

impl std::fmt::Debug for ScopedHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedHistory").field("closed", &self.inner.is_closed()).finish()
    }
}
