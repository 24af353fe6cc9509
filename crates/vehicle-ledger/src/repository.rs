//! Typed record repositories over a [`VersionedStore`].
//!
//! A [`RecordRepository<R>`] owns nothing but a store handle. It derives the
//! key for `R`'s namespace, runs the codec, and maps substrate failures onto
//! [`RecordError`] with the key attached.
//!
//! ```text
//! set(record) ──► derive_key ──► encode ──► store.put ──► TxId
//! get(id)     ──► derive_key ──► store.get ──► decode ──► R
//! history(id) ──► derive_key ──► history::reconstruct ──► Vec<HistoryEntry>
//! delete(id)  ──► derive_key ──► txn.get ──► txn.delete ──► txn.commit ──► TxId
//! ```

use std::{fmt, marker::PhantomData, sync::Arc};

use bytes::Bytes;
use vehicle_ledger_storage::{StorageError, TxId, VersionedStore};

use crate::{
    codec::{self, Record},
    error::{RecordError, RecordResult},
    history::{self, HistoryEntry},
    keys::{RecordKey, derive_key},
};

/// Repository for one record kind.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use vehicle_ledger::{RecordRepository, ServiceRecord};
/// use vehicle_ledger_storage::MemoryLedger;
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let repo = RecordRepository::<ServiceRecord>::new(Arc::new(MemoryLedger::new()));
///
/// let visit = ServiceRecord::builder()
///     .reg_number("KA01")
///     .chassis_number("CH1")
///     .engine_number("EN1")
///     .month_year_of_mfg("01-2020")
///     .service_details("first service")
///     .build();
/// repo.set(&visit).await.unwrap();
///
/// assert_eq!(repo.get("KA01").await.unwrap(), visit);
/// assert_eq!(repo.history("KA01").await.unwrap().len(), 1);
/// # });
/// ```
pub struct RecordRepository<R: Record> {
    store: Arc<dyn VersionedStore>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> RecordRepository<R> {
    /// Creates a repository over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn VersionedStore>) -> Self {
        Self { store, _record: PhantomData }
    }

    /// Appends a new version of `record` under its registration number.
    ///
    /// # Errors
    ///
    /// - [`RecordError::InvalidIdentifier`] if the registration number is empty
    /// - [`RecordError::Encoding`] if the record cannot be encoded
    /// - [`RecordError::StoreWrite`] if the ledger rejects the write
    #[tracing::instrument(skip_all, fields(kind = R::KIND.as_str(), id = record.reg_number()))]
    pub async fn set(&self, record: &R) -> RecordResult<TxId> {
        let key = derive_key(R::KIND, record.reg_number())?;
        let bytes = codec::encode(record)?;

        let tx_id = self
            .store
            .put(key.as_bytes().to_vec(), bytes)
            .await
            .map_err(|source| write_error(&key, source))?;

        tracing::debug!(tx_id = %tx_id, "record version appended");
        Ok(tx_id)
    }

    /// Reads the latest version.
    ///
    /// # Errors
    ///
    /// - [`RecordError::InvalidIdentifier`] if `id` is empty
    /// - [`RecordError::NotFound`] if there is no live version
    /// - [`RecordError::MalformedRecord`] if the stored bytes do not decode
    /// - [`RecordError::StoreRead`] on substrate failure
    #[tracing::instrument(skip_all, fields(kind = R::KIND.as_str(), id = id))]
    pub async fn get(&self, id: &str) -> RecordResult<R> {
        let key = derive_key(R::KIND, id)?;
        match self.read(&key).await? {
            Some(bytes) => codec::decode(&key, &bytes),
            None => Err(RecordError::NotFound { kind: R::KIND, id: id.to_owned() }),
        }
    }

    /// Returns whether the record has a live version, without decoding it.
    ///
    /// # Errors
    ///
    /// - [`RecordError::InvalidIdentifier`] if `id` is empty
    /// - [`RecordError::StoreRead`] on substrate failure
    #[tracing::instrument(skip_all, fields(kind = R::KIND.as_str(), id = id))]
    pub async fn exists(&self, id: &str) -> RecordResult<bool> {
        let key = derive_key(R::KIND, id)?;
        Ok(self.read(&key).await?.is_some())
    }

    /// Appends a tombstone, so later reads report [`RecordError::NotFound`]
    /// while history keeps every prior version.
    ///
    /// The liveness check and the tombstone run in one ledger transaction. If
    /// another writer changes the record in between, the commit is rejected
    /// and nothing is appended.
    ///
    /// # Errors
    ///
    /// - [`RecordError::InvalidIdentifier`] if `id` is empty
    /// - [`RecordError::NotFound`] if there is no live version to delete
    /// - [`RecordError::StoreWrite`] on substrate failure, including a
    ///   transient [`StorageError::Conflict`] from a concurrent writer
    /// - [`RecordError::StoreRead`] if the liveness check fails
    #[tracing::instrument(skip_all, fields(kind = R::KIND.as_str(), id = id))]
    pub async fn delete(&self, id: &str) -> RecordResult<TxId> {
        let key = derive_key(R::KIND, id)?;
        let mut txn = self.store.transaction().await.map_err(|source| write_error(&key, source))?;

        if txn.get(key.as_bytes()).await.map_err(|source| read_error(&key, source))?.is_none() {
            return Err(RecordError::NotFound { kind: R::KIND, id: id.to_owned() });
        }
        txn.delete(key.as_bytes().to_vec());

        let tx_id = txn.commit().await.map_err(|source| write_error(&key, source))?;

        tracing::debug!(tx_id = %tx_id, "record tombstoned");
        Ok(tx_id)
    }

    /// Reconstructs the full version chain, oldest first.
    ///
    /// A never-written id yields an empty history.
    ///
    /// # Errors
    ///
    /// - [`RecordError::InvalidIdentifier`] if `id` is empty
    /// - [`RecordError::HistoryRead`] if the walk fails
    #[tracing::instrument(skip_all, fields(kind = R::KIND.as_str(), id = id))]
    pub async fn history(&self, id: &str) -> RecordResult<Vec<HistoryEntry>> {
        let key = derive_key(R::KIND, id)?;
        history::reconstruct(self.store.as_ref(), &key).await
    }

    async fn read(&self, key: &RecordKey) -> RecordResult<Option<Bytes>> {
        self.store.get(key.as_bytes()).await.map_err(|source| read_error(key, source))
    }
}

fn read_error(key: &RecordKey, source: StorageError) -> RecordError {
    tracing::warn!(key = %key, error = %source, "ledger read failed");
    RecordError::StoreRead { key: key.to_string(), source }
}

fn write_error(key: &RecordKey, source: StorageError) -> RecordError {
    tracing::warn!(key = %key, error = %source, "ledger write failed");
    RecordError::StoreWrite { key: key.to_string(), source }
}

impl<R: Record> Clone for RecordRepository<R> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), _record: PhantomData }
    }
}

impl<R: Record> fmt::Debug for RecordRepository<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordRepository").field("kind", &R::KIND).finish_non_exhaustive()
    }
}
