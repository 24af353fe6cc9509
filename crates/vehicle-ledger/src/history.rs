//! History reconstruction and rendering.
//!
//! [`reconstruct`] walks one key's version chain through the store's
//! [`HistoryIterator`](vehicle_ledger_storage::HistoryIterator) and turns each
//! version into a [`HistoryEntry`]. [`render_history`] serializes entries to
//! the audit-log wire shape:
//!
//! ```text
//! [
//!   {"TxId": "9f2c…", "Value": {"PolicyNumber": "P1", …}, "Timestamp": "2024-01-02T03:04:05.123456789Z", "IsDelete": "false"},
//!   {"TxId": "41ab…", "Value": null,                     "Timestamp": "2024-01-03T00:00:00.000000000Z", "IsDelete": "true"}
//! ]
//! ```
//!
//! # Ordering
//!
//! Entries come out in exactly the order the store yields them, which is
//! ledger-commit order, oldest first. Nothing here re-sorts.
//!
//! # Payloads
//!
//! Stored bytes that parse as JSON are embedded verbatim as a
//! [`RawValue`], so key order and number spelling survive the round trip.
//! Anything else appears as a JSON string.
//!
//! # Resource Release
//!
//! The cursor is held in a [`ScopedHistory`] for the whole walk, so it is
//! closed on success, on the first error, and when the caller drops the
//! future mid-walk.
//!
//! # Failure
//!
//! Any cursor error aborts the walk with [`RecordError::HistoryRead`]. A
//! truncated history is never returned.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::{RawValue, to_raw_value};
use vehicle_ledger_storage::{KeyModification, ScopedHistory, StorageError, TxId, VersionedStore};

use crate::{
    error::{RecordError, RecordResult},
    keys::RecordKey,
};

/// One reconstructed version of a record.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Transaction that committed this version.
    pub tx_id: TxId,
    /// Payload exactly as stored; `None` for tombstones.
    pub value: Option<Box<RawValue>>,
    /// Commit time.
    pub timestamp: DateTime<Utc>,
    /// Whether this version is a tombstone.
    pub is_delete: bool,
}

impl HistoryEntry {
    fn from_version(key: &RecordKey, version: KeyModification) -> RecordResult<Self> {
        let timestamp = version.timestamp.to_datetime().ok_or_else(|| RecordError::HistoryRead {
            key: key.to_string(),
            source: StorageError::serialization(format!(
                "commit timestamp out of range: {}s {}ns",
                version.timestamp.seconds, version.timestamp.nanos
            )),
        })?;

        let value =
            if version.is_delete { None } else { Some(embed_payload(key, &version.value)?) };

        Ok(Self { tx_id: version.tx_id, value, timestamp, is_delete: version.is_delete })
    }

    /// Returns the payload's JSON text, or `None` for tombstones.
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        self.value.as_deref().map(RawValue::get)
    }
}

impl PartialEq for HistoryEntry {
    fn eq(&self, other: &Self) -> bool {
        self.tx_id == other.tx_id
            && self.payload() == other.payload()
            && self.timestamp == other.timestamp
            && self.is_delete == other.is_delete
    }
}

/// Valid JSON is embedded byte for byte. Anything else is kept visible as a
/// JSON string rather than dropped.
fn embed_payload(key: &RecordKey, bytes: &[u8]) -> RecordResult<Box<RawValue>> {
    let verbatim = std::str::from_utf8(bytes)
        .ok()
        .and_then(|text| RawValue::from_string(text.to_owned()).ok());

    match verbatim {
        Some(raw) => Ok(raw),
        None => to_raw_value(&String::from_utf8_lossy(bytes)).map_err(|source| {
            RecordError::HistoryRead {
                key: key.to_string(),
                source: StorageError::serialization_with_source("payload not embeddable", source),
            }
        }),
    }
}

/// Walks the version chain of `key`, oldest first.
///
/// A key that was never written yields an empty history.
///
/// # Errors
///
/// Returns [`RecordError::HistoryRead`] if the cursor cannot be opened, fails
/// mid-walk, reports an unrepresentable commit time, or yields a payload that
/// cannot be embedded.
#[tracing::instrument(skip_all, fields(key = %key))]
pub async fn reconstruct(
    store: &dyn VersionedStore,
    key: &RecordKey,
) -> RecordResult<Vec<HistoryEntry>> {
    let read_error = |source: StorageError| {
        tracing::warn!(error = %source, "history walk failed");
        RecordError::HistoryRead { key: key.to_string(), source }
    };

    let mut cursor = ScopedHistory::new(store.history(key.as_bytes()).await.map_err(read_error)?);

    let mut entries = Vec::new();
    while let Some(version) = cursor.next().await.map_err(read_error)? {
        entries.push(HistoryEntry::from_version(key, version)?);
    }
    cursor.close();

    tracing::debug!(versions = entries.len(), "history reconstructed");
    Ok(entries)
}

/// How `IsDelete` is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteFlagFormat {
    /// `"true"` / `"false"`, the established wire format.
    #[default]
    String,
    /// Native JSON `true` / `false`.
    Boolean,
}

#[derive(Serialize)]
#[serde(untagged)]
enum DeleteFlag {
    Text(&'static str),
    Bool(bool),
}

impl DeleteFlag {
    fn new(is_delete: bool, format: DeleteFlagFormat) -> Self {
        match format {
            DeleteFlagFormat::String => Self::Text(if is_delete { "true" } else { "false" }),
            DeleteFlagFormat::Boolean => Self::Bool(is_delete),
        }
    }
}

#[derive(Serialize)]
struct WireEntry<'a> {
    #[serde(rename = "TxId")]
    tx_id: &'a str,
    #[serde(rename = "Value")]
    value: Option<&'a RawValue>,
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "IsDelete")]
    is_delete: DeleteFlag,
}

/// Renders a commit time as RFC 3339 UTC with nanoseconds and a `Z` suffix.
#[must_use]
pub fn render_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Serializes entries as a JSON array in the audit-log wire shape.
///
/// # Errors
///
/// Returns the `serde_json` error if serialization fails.
pub fn render_history(
    entries: &[HistoryEntry],
    format: DeleteFlagFormat,
) -> Result<String, serde_json::Error> {
    let wire: Vec<WireEntry<'_>> = entries
        .iter()
        .map(|entry| WireEntry {
            tx_id: entry.tx_id.as_str(),
            value: entry.value.as_deref(),
            timestamp: render_timestamp(&entry.timestamp),
            is_delete: DeleteFlag::new(entry.is_delete, format),
        })
        .collect();
    serde_json::to_string(&wire)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        time::Duration,
    };

    use async_trait::async_trait;
    use bytes::Bytes;
    use serde_json::{Value, json};
    use vehicle_ledger_storage::{
        HistoryIterator, LedgerTimestamp, LedgerTransaction, MemoryLedger, StorageResult,
        testutil::{FailingStore, FailurePlan},
    };

    use super::*;
    use crate::keys::{RecordKind, derive_key};

    fn key(id: &str) -> RecordKey {
        derive_key(RecordKind::Registration, id).unwrap()
    }

    fn entry(tx: &str, payload: Option<&str>, seconds: i64, nanos: u32) -> HistoryEntry {
        HistoryEntry {
            tx_id: TxId::from(tx),
            is_delete: payload.is_none(),
            value: payload.map(|text| RawValue::from_string(text.to_owned()).unwrap()),
            timestamp: DateTime::from_timestamp(seconds, nanos).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_reconstruct_orders_and_marks_tombstones() {
        let ledger = MemoryLedger::new();
        let k = key("REG1");
        let t1 = ledger.put(k.as_bytes().to_vec(), br#"{"n":1}"#.to_vec()).await.unwrap();
        let t2 = ledger.delete(k.as_bytes()).await.unwrap();
        let t3 = ledger.put(k.as_bytes().to_vec(), br#"{"n":3}"#.to_vec()).await.unwrap();

        let entries = reconstruct(&ledger, &k).await.unwrap();

        let tx_ids: Vec<&TxId> = entries.iter().map(|e| &e.tx_id).collect();
        assert_eq!(tx_ids, vec![&t1, &t2, &t3]);
        assert_eq!(entries[0].payload(), Some(r#"{"n":1}"#));
        assert_eq!(entries[1].payload(), None);
        assert!(entries[1].is_delete);
        assert_eq!(entries[2].payload(), Some(r#"{"n":3}"#));
        assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(ledger.open_iterators(), 0);
    }

    #[tokio::test]
    async fn test_reconstruct_missing_key_is_empty() {
        let ledger = MemoryLedger::new();
        assert!(reconstruct(&ledger, &key("NOPE")).await.unwrap().is_empty());
        assert_eq!(ledger.open_iterators(), 0);
    }

    #[tokio::test]
    async fn test_non_json_payload_passes_through_as_string() {
        let ledger = MemoryLedger::new();
        let k = key("REG1");
        ledger.put(k.as_bytes().to_vec(), b"not json".to_vec()).await.unwrap();

        let entries = reconstruct(&ledger, &k).await.unwrap();
        assert_eq!(entries[0].payload(), Some(r#""not json""#));
    }

    #[tokio::test]
    async fn test_json_payload_embedded_verbatim() {
        let ledger = MemoryLedger::new();
        let k = key("REG1");
        let stored = [
            r#"{"zeta":1,"alpha":{"b":2,"a":1}}"#,
            r#"{"odometer":1e400}"#,
            r#"{"reading":1.50}"#,
        ];
        for payload in stored {
            ledger.put(k.as_bytes().to_vec(), payload.as_bytes().to_vec()).await.unwrap();
        }

        let entries = reconstruct(&ledger, &k).await.unwrap();
        let payloads: Vec<_> = entries.iter().filter_map(HistoryEntry::payload).collect();
        assert_eq!(payloads, stored);

        let rendered = render_history(&entries, DeleteFlagFormat::String).unwrap();
        for payload in stored {
            assert!(rendered.contains(&format!(r#""Value":{payload},"#)), "{rendered}");
        }
    }

    #[tokio::test]
    async fn test_invalid_utf8_payload_is_lossy_string() {
        let ledger = MemoryLedger::new();
        let k = key("REG1");
        ledger.put(k.as_bytes().to_vec(), vec![b'{', 0xff]).await.unwrap();

        let entries = reconstruct(&ledger, &k).await.unwrap();
        assert_eq!(entries[0].payload(), Some("\"{\u{fffd}\""));
    }

    #[tokio::test]
    async fn test_cursor_error_aborts_and_releases() {
        let store = FailingStore::new(MemoryLedger::new());
        let k = key("REG1");
        for i in 0..3 {
            store.put(k.as_bytes().to_vec(), format!("{{\"n\":{i}}}").into_bytes()).await.unwrap();
        }
        store.set_plan(FailurePlan {
            history_fails_after: Some((2, StorageError::connection("stream reset"))),
            ..FailurePlan::default()
        });

        let err = reconstruct(&store, &k).await.unwrap_err();
        assert!(matches!(err, RecordError::HistoryRead { .. }), "got {err:?}");
        assert!(err.is_transient());
        assert_eq!(store.open_cursors(), 0);
        assert_eq!(store.inner().open_iterators(), 0);
    }

    #[tokio::test]
    async fn test_open_error_is_history_read() {
        let store = FailingStore::new(MemoryLedger::new());
        store.set_plan(FailurePlan {
            open_history: Some(StorageError::timeout()),
            ..FailurePlan::default()
        });

        let err = reconstruct(&store, &key("REG1")).await.unwrap_err();
        assert!(matches!(
            err,
            RecordError::HistoryRead { source: StorageError::Timeout, .. }
        ));
    }

    /// Yields one version, then never completes.
    struct StallingStore {
        closed: Arc<AtomicBool>,
    }

    struct StallingIterator {
        yielded: bool,
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl HistoryIterator for StallingIterator {
        async fn next(&mut self) -> StorageResult<Option<KeyModification>> {
            if !self.yielded {
                self.yielded = true;
                return Ok(Some(KeyModification::write(
                    TxId::from("tx-1"),
                    Bytes::from_static(b"{}"),
                    LedgerTimestamp::new(1, 0),
                )));
            }
            std::future::pending().await
        }

        fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }

        fn is_closed(&self) -> bool {
            self.closed.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl VersionedStore for StallingStore {
        async fn get(&self, _key: &[u8]) -> StorageResult<Option<Bytes>> {
            Ok(None)
        }

        async fn put(&self, _key: Vec<u8>, _value: Vec<u8>) -> StorageResult<TxId> {
            Err(StorageError::internal("read-only"))
        }

        async fn delete(&self, _key: &[u8]) -> StorageResult<TxId> {
            Err(StorageError::internal("read-only"))
        }

        async fn history(&self, _key: &[u8]) -> StorageResult<Box<dyn HistoryIterator>> {
            Ok(Box::new(StallingIterator { yielded: false, closed: Arc::clone(&self.closed) }))
        }

        async fn transaction(&self) -> StorageResult<Box<dyn LedgerTransaction>> {
            Err(StorageError::internal("read-only"))
        }

        async fn health_check(&self) -> StorageResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dropped_walk_closes_cursor() {
        let closed = Arc::new(AtomicBool::new(false));
        let store = StallingStore { closed: Arc::clone(&closed) };
        let k = key("REG1");

        let result = tokio::time::timeout(Duration::from_millis(20), reconstruct(&store, &k)).await;

        assert!(result.is_err(), "walk should still be pending when the timeout fires");
        assert!(closed.load(Ordering::SeqCst), "cursor must be closed when the future is dropped");
    }

    #[test]
    fn test_out_of_range_timestamp_is_history_read() {
        let k = key("REG1");
        let bad = KeyModification::write(
            TxId::from("tx"),
            Bytes::from_static(b"{}"),
            LedgerTimestamp::new(0, -1),
        );
        let err = HistoryEntry::from_version(&k, bad).unwrap_err();
        assert!(matches!(err, RecordError::HistoryRead { .. }));
    }

    #[test]
    fn test_render_wire_shape_and_key_order() {
        let entries = vec![
            entry("tx-1", Some(r#"{"PolicyNumber":"P1"}"#), 1_704_164_645, 123_456_789),
            entry("tx-2", None, 1_704_240_000, 0),
        ];

        let rendered = render_history(&entries, DeleteFlagFormat::String).unwrap();
        assert_eq!(
            rendered,
            concat!(
                r#"[{"TxId":"tx-1","Value":{"PolicyNumber":"P1"},"#,
                r#""Timestamp":"2024-01-02T03:04:05.123456789Z","IsDelete":"false"},"#,
                r#"{"TxId":"tx-2","Value":null,"#,
                r#""Timestamp":"2024-01-03T00:00:00.000000000Z","IsDelete":"true"}]"#,
            )
        );
    }

    #[test]
    fn test_render_boolean_flag() {
        let entries = vec![entry("tx-1", None, 0, 0)];
        let rendered = render_history(&entries, DeleteFlagFormat::Boolean).unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed[0]["IsDelete"], json!(true));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_history(&[], DeleteFlagFormat::String).unwrap(), "[]");
    }

    #[test]
    fn test_delete_flag_format_deserializes_lowercase() {
        let format: DeleteFlagFormat = serde_json::from_str(r#""boolean""#).unwrap();
        assert_eq!(format, DeleteFlagFormat::Boolean);
        assert!(serde_json::from_str::<DeleteFlagFormat>(r#""Bool""#).is_err());
    }
}
