//! Shared test utilities for versioned store testing.
//!
//! Feature-gated behind `testutil` so none of it leaks into production
//! builds.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! vehicle-ledger-storage = { path = "../storage", features = ["testutil"] }
//! ```
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use vehicle_ledger_storage::testutil::{FailingStore, collect_history, make_key};
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use crate::{
    HistoryIterator, KeyModification, LedgerTransaction, MemoryLedger, ScopedHistory, StorageError,
    StorageResult, TxId, VersionedStore,
};

/// Create a deterministic test key like `"prefix:000042"`.
#[must_use]
pub fn make_key(prefix: &str, idx: usize) -> Vec<u8> {
    format!("{prefix}:{idx:06}").into_bytes()
}

/// Create a test value tagged with a sequence number, like `"version-0007"`.
#[must_use]
pub fn make_version_value(seq: usize) -> Vec<u8> {
    format!("version-{seq:04}").into_bytes()
}

/// Create a [`MemoryLedger`] where `key` already has `versions` versions.
///
/// # Panics
///
/// Panics if any `put` fails (should not happen with default limits).
pub async fn ledger_with_chain(key: &[u8], versions: usize) -> MemoryLedger {
    let ledger = MemoryLedger::new();
    for seq in 0..versions {
        ledger.put(key.to_vec(), make_version_value(seq)).await.expect("populate put failed");
    }
    ledger
}

/// Walks the full version chain of `key` through a [`ScopedHistory`].
///
/// # Errors
///
/// Returns the first error the cursor produced.
pub async fn collect_history(
    store: &dyn VersionedStore,
    key: &[u8],
) -> StorageResult<Vec<KeyModification>> {
    let mut cursor = ScopedHistory::new(store.history(key).await?);
    let mut out = Vec::new();
    while let Some(version) = cursor.next().await? {
        out.push(version);
    }
    Ok(out)
}

/// Which [`FailingStore`] operation should fail.
#[derive(Debug, Clone, Default)]
pub struct FailurePlan {
    /// Fail every `get` with this error.
    pub get: Option<StorageError>,
    /// Fail every `put`/`delete` with this error.
    pub write: Option<StorageError>,
    /// Fail `history` itself (before a cursor is opened).
    pub open_history: Option<StorageError>,
    /// Let the cursor yield this many versions, then fail.
    pub history_fails_after: Option<(usize, StorageError)>,
}

/// [`VersionedStore`] wrapper around a [`MemoryLedger`] that injects
/// failures according to a [`FailurePlan`].
///
/// Tracks how many of its cursors are still open, so tests can assert
/// resources are released on error paths.
#[derive(Clone)]
pub struct FailingStore {
    inner: MemoryLedger,
    plan: Arc<Mutex<FailurePlan>>,
    open_cursors: Arc<AtomicUsize>,
}

impl FailingStore {
    /// Wraps `inner` with an empty plan (no failures).
    #[must_use]
    pub fn new(inner: MemoryLedger) -> Self {
        Self {
            inner,
            plan: Arc::new(Mutex::new(FailurePlan::default())),
            open_cursors: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replaces the failure plan.
    pub fn set_plan(&self, plan: FailurePlan) {
        *self.plan.lock() = plan;
    }

    /// Returns the wrapped ledger.
    #[must_use]
    pub fn inner(&self) -> &MemoryLedger {
        &self.inner
    }

    /// Number of cursors handed out and not yet closed.
    #[must_use]
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VersionedStore for FailingStore {
    async fn get(&self, key: &[u8]) -> StorageResult<Option<Bytes>> {
        let planned = self.plan.lock().get.clone();
        if let Some(err) = planned {
            return Err(err);
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: Vec<u8>, value: Vec<u8>) -> StorageResult<TxId> {
        let planned = self.plan.lock().write.clone();
        if let Some(err) = planned {
            return Err(err);
        }
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &[u8]) -> StorageResult<TxId> {
        let planned = self.plan.lock().write.clone();
        if let Some(err) = planned {
            return Err(err);
        }
        self.inner.delete(key).await
    }

    async fn history(&self, key: &[u8]) -> StorageResult<Box<dyn HistoryIterator>> {
        let (open_err, fail_after) = {
            let plan = self.plan.lock();
            (plan.open_history.clone(), plan.history_fails_after.clone())
        };
        if let Some(err) = open_err {
            return Err(err);
        }

        let inner = self.inner.history(key).await?;
        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FailingHistory {
            inner,
            fail_after,
            yielded: 0,
            open_cursors: Arc::clone(&self.open_cursors),
            closed: false,
        }))
    }

    async fn transaction(&self) -> StorageResult<Box<dyn LedgerTransaction>> {
        let planned = self.plan.lock().write.clone();
        if let Some(err) = planned {
            return Err(err);
        }
        self.inner.transaction().await
    }

    async fn health_check(&self) -> StorageResult<()> {
        self.inner.health_check().await
    }
}

struct FailingHistory {
    inner: Box<dyn HistoryIterator>,
    fail_after: Option<(usize, StorageError)>,
    yielded: usize,
    open_cursors: Arc<AtomicUsize>,
    closed: bool,
}

#[async_trait]
impl HistoryIterator for FailingHistory {
    async fn next(&mut self) -> StorageResult<Option<KeyModification>> {
        if let Some((limit, err)) = &self.fail_after {
            if self.yielded >= *limit {
                return Err(err.clone());
            }
        }
        let version = self.inner.next().await?;
        if version.is_some() {
            self.yielded += 1;
        }
        Ok(version)
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.inner.close();
            self.open_cursors.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
