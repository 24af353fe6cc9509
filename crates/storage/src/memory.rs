//! In-memory ledger implementation.
//!
//! [`MemoryLedger`] is a process-local stand-in for the ledger substrate,
//! suitable for tests and development.
//!
//! # Features
//!
//! - **Append-only**: every write and delete appends to the key's version chain
//! - **Commit ordering**: commits are serialized under one lock and stamped
//!   with a monotonically non-decreasing timestamp
//! - **Transaction ids**: one SHA-256 hex id per commit, shared by all writes
//!   in that commit
//! - **Read validation**: a transaction commit fails with
//!   [`StorageError::Conflict`] if a key it read has gained a version since
//! - **Snapshot iterators**: history cursors copy the chain at open time, so
//!   later commits never disturb a walk in progress
//! - **Leak accounting**: [`open_iterators`](MemoryLedger::open_iterators)
//!   counts cursors that were opened but not yet closed
//!
//! # Example
//!
//! ```
//! use vehicle_ledger_storage::{MemoryLedger, VersionedStore};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let ledger = MemoryLedger::new();
//!
//! ledger.put(b"registration_KA01".to_vec(), b"{}".to_vec()).await.unwrap();
//! ledger.delete(b"registration_KA01").await.unwrap();
//!
//! assert_eq!(ledger.get(b"registration_KA01").await.unwrap(), None);
//! assert_eq!(ledger.version_count(b"registration_KA01"), 2);
//! # });
//! ```
//!
//! # Limitations
//!
//! - Data is not persisted; all versions are lost when the process exits
//! - No replication, endorsement or cross-process ordering

use std::{
    borrow::Cow,
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use fail::fail_point;
use parking_lot::{Mutex, RwLock};
use sha2::{Digest, Sha256};

use crate::{
    backend::VersionedStore,
    config::MemoryLedgerConfig,
    error::{ConfigError, StorageError, StorageResult},
    iterator::HistoryIterator,
    transaction::LedgerTransaction,
    types::{KeyModification, LedgerTimestamp, TxId},
};

/// Renders a byte key for log fields.
fn display_key(key: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(key)
}

/// Version chains plus the commit clock, guarded together so that commit
/// order and timestamp order always agree.
#[derive(Default)]
struct Chains {
    versions: BTreeMap<Vec<u8>, Vec<KeyModification>>,
    commits: u64,
    last_commit: Option<DateTime<Utc>>,
}

struct LedgerState {
    config: MemoryLedgerConfig,
    chains: RwLock<Chains>,
    open_iterators: AtomicUsize,
}

/// In-memory [`VersionedStore`].
///
/// # Cloning
///
/// `MemoryLedger` is cheaply cloneable via [`Arc`]. All clones share the
/// same version chains.
#[derive(Clone)]
pub struct MemoryLedger {
    state: Arc<LedgerState>,
}

impl MemoryLedger {
    /// Creates a ledger with [`MemoryLedgerConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::from_validated(MemoryLedgerConfig::default())
    }

    /// Creates a ledger with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration fails validation
    /// (possible when it was deserialized rather than built).
    pub fn with_config(config: MemoryLedgerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: MemoryLedgerConfig) -> Self {
        Self {
            state: Arc::new(LedgerState {
                config,
                chains: RwLock::new(Chains::default()),
                open_iterators: AtomicUsize::new(0),
            }),
        }
    }

    /// Returns the ledger name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.state.config.name()
    }

    /// Number of history cursors opened and not yet closed.
    #[must_use]
    pub fn open_iterators(&self) -> usize {
        self.state.open_iterators.load(Ordering::SeqCst)
    }

    /// Number of versions (including tombstones) in the chain for `key`.
    #[must_use]
    pub fn version_count(&self, key: &[u8]) -> usize {
        self.state.chains.read().versions.get(key).map_or(0, Vec::len)
    }

    /// Number of commits applied so far.
    #[must_use]
    pub fn commit_count(&self) -> u64 {
        self.state.chains.read().commits
    }

    /// Derives the transaction id for the `sequence`-th commit.
    fn issue_tx_id(&self, sequence: u64, committed_at: DateTime<Utc>) -> TxId {
        let stamp = LedgerTimestamp::from(committed_at);
        let mut hasher = Sha256::new();
        hasher.update(self.name().as_bytes());
        hasher.update(sequence.to_be_bytes());
        hasher.update(stamp.seconds.to_be_bytes());
        hasher.update(stamp.nanos.to_be_bytes());
        TxId::new(hex::encode(hasher.finalize()))
    }

    /// Appends every write under one transaction id.
    ///
    /// `None` values append tombstones. Size limits are checked for all
    /// writes before anything is appended. `reads` maps each key read by the
    /// transaction to its chain length at read time; any mismatch aborts the
    /// commit with [`StorageError::Conflict`].
    fn commit_writes(
        &self,
        reads: &BTreeMap<Vec<u8>, usize>,
        writes: Vec<(Vec<u8>, Option<Vec<u8>>)>,
    ) -> StorageResult<TxId> {
        let limits = self.state.config.size_limits();
        for (key, value) in &writes {
            limits.check(key, value.as_deref().unwrap_or_default())?;
        }

        fail_point!("ledger-before-commit", |_| {
            Err(StorageError::internal("injected failure before ledger commit"))
        });

        let mut chains = self.state.chains.write();

        for (key, seen) in reads {
            if Self::chain_len(&chains, key) != *seen {
                tracing::debug!(key = %display_key(key), "read version changed before commit");
                return Err(StorageError::conflict());
            }
        }

        let now = Utc::now();
        let committed_at = match chains.last_commit {
            Some(last) if last > now => last,
            _ => now,
        };
        chains.last_commit = Some(committed_at);
        chains.commits += 1;

        let tx_id = self.issue_tx_id(chains.commits, committed_at);
        let timestamp = LedgerTimestamp::from(committed_at);
        let write_count = writes.len();

        for (key, value) in writes {
            let version = match value {
                Some(value) => KeyModification::write(tx_id.clone(), Bytes::from(value), timestamp),
                None => KeyModification::tombstone(tx_id.clone(), timestamp),
            };
            chains.versions.entry(key).or_default().push(version);
        }

        tracing::debug!(tx_id = %tx_id, writes = write_count, "committed ledger transaction");
        Ok(tx_id)
    }

    fn chain_len(chains: &Chains, key: &[u8]) -> usize {
        chains.versions.get(key).map_or(0, Vec::len)
    }

    /// Latest live value for `key`, reading under the given guard.
    fn latest(chains: &Chains, key: &[u8]) -> Option<Bytes> {
        chains
            .versions
            .get(key)
            .and_then(|chain| chain.last())
            .filter(|version| !version.is_delete)
            .map(|version| version.value.clone())
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLedger")
            .field("name", &self.name())
            .field("open_iterators", &self.open_iterators())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl VersionedStore for MemoryLedger {
    #[tracing::instrument(skip_all, fields(key = %display_key(key)))]
    async fn get(&self, key: &[u8]) -> StorageResult<Option<Bytes>> {
        let chains = self.state.chains.read();
        Ok(Self::latest(&chains, key))
    }

    #[tracing::instrument(skip_all, fields(key = %display_key(&key), size = value.len()))]
    async fn put(&self, key: Vec<u8>, value: Vec<u8>) -> StorageResult<TxId> {
        self.commit_writes(&BTreeMap::new(), vec![(key, Some(value))])
    }

    #[tracing::instrument(skip_all, fields(key = %display_key(key)))]
    async fn delete(&self, key: &[u8]) -> StorageResult<TxId> {
        self.commit_writes(&BTreeMap::new(), vec![(key.to_vec(), None)])
    }

    #[tracing::instrument(skip_all, fields(key = %display_key(key)))]
    async fn history(&self, key: &[u8]) -> StorageResult<Box<dyn HistoryIterator>> {
        let snapshot = self.state.chains.read().versions.get(key).cloned().unwrap_or_default();
        self.state.open_iterators.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MemoryHistoryIterator {
            versions: snapshot.into_iter(),
            ledger: self.clone(),
            closed: false,
        }))
    }

    #[tracing::instrument(skip_all)]
    async fn transaction(&self) -> StorageResult<Box<dyn LedgerTransaction>> {
        Ok(Box::new(MemoryTransaction {
            ledger: self.clone(),
            reads: Mutex::new(BTreeMap::new()),
            pending: BTreeMap::new(),
        }))
    }

    #[tracing::instrument(skip_all)]
    async fn health_check(&self) -> StorageResult<()> {
        fail_point!("health-check", |_| {
            Err(StorageError::connection("injected health check failure"))
        });

        // Acquire the read lock to verify we're not deadlocked
        let _unused = self.state.chains.read();
        Ok(())
    }
}

/// Snapshot cursor over one key's version chain.
struct MemoryHistoryIterator {
    versions: std::vec::IntoIter<KeyModification>,
    ledger: MemoryLedger,
    closed: bool,
}

#[async_trait]
impl HistoryIterator for MemoryHistoryIterator {
    async fn next(&mut self) -> StorageResult<Option<KeyModification>> {
        if self.closed {
            return Err(StorageError::IteratorClosed);
        }

        fail_point!("history-next", |_| {
            Err(StorageError::connection("injected history stream failure"))
        });

        Ok(self.versions.next())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.ledger.state.open_iterators.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Buffered transaction over a [`MemoryLedger`].
///
/// Later writes to the same key within one transaction replace earlier ones,
/// so each key gains at most one version per commit. Keys read from the
/// ledger remember their chain length at first read.
struct MemoryTransaction {
    ledger: MemoryLedger,
    reads: Mutex<BTreeMap<Vec<u8>, usize>>,
    pending: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

#[async_trait]
impl LedgerTransaction for MemoryTransaction {
    async fn get(&self, key: &[u8]) -> StorageResult<Option<Bytes>> {
        // Read-your-writes
        if let Some(value) = self.pending.get(key) {
            return Ok(value.as_ref().map(|v| Bytes::copy_from_slice(v)));
        }

        let chains = self.ledger.state.chains.read();
        self.reads
            .lock()
            .entry(key.to_vec())
            .or_insert_with(|| MemoryLedger::chain_len(&chains, key));
        Ok(MemoryLedger::latest(&chains, key))
    }

    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.pending.insert(key, Some(value));
    }

    fn delete(&mut self, key: Vec<u8>) {
        self.pending.insert(key, None);
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }

    async fn commit(self: Box<Self>) -> StorageResult<TxId> {
        let Self { ledger, reads, pending } = *self;
        ledger.commit_writes(&reads.into_inner(), pending.into_iter().collect())
    }
}
