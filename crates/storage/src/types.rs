//! Value types exchanged with the ledger substrate.
//!
//! A key's version chain is a sequence of [`KeyModification`]s, each stamped
//! with the [`TxId`] of the transaction that committed it and the
//! [`LedgerTimestamp`] at which it was committed.

use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of the ledger transaction that committed a version.
///
/// Opaque to this crate: substrates choose their own format. The
/// [`MemoryLedger`](crate::MemoryLedger) issues 64-character lowercase hex
/// strings.
///
/// # Examples
///
/// ```
/// use vehicle_ledger_storage::TxId;
///
/// let tx = TxId::from("9f2c");
/// assert_eq!(tx.as_str(), "9f2c");
/// assert_eq!(tx.to_string(), "9f2c");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    /// Wraps a substrate-issued transaction identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper, returning the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<&str> for TxId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for TxId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Commit time as the substrate reports it: whole seconds since the Unix
/// epoch plus a sub-second nanosecond component.
///
/// # Examples
///
/// ```
/// use vehicle_ledger_storage::LedgerTimestamp;
///
/// let ts = LedgerTimestamp::new(1_700_000_000, 250_000_000);
/// let instant = ts.to_datetime().unwrap();
/// assert_eq!(instant.timestamp(), 1_700_000_000);
/// assert_eq!(instant.timestamp_subsec_millis(), 250);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LedgerTimestamp {
    /// Seconds since the Unix epoch.
    pub seconds: i64,
    /// Sub-second component in nanoseconds, `0..1_000_000_000`.
    pub nanos: i32,
}

impl LedgerTimestamp {
    /// Creates a timestamp from its raw parts.
    #[must_use]
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    /// Combines the pair into one UTC instant.
    ///
    /// Returns `None` if the pair is out of range (negative or overflowing
    /// nanos, or seconds beyond what `chrono` can represent).
    #[must_use]
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let nanos = u32::try_from(self.nanos).ok()?;
        DateTime::from_timestamp(self.seconds, nanos)
    }
}

impl From<DateTime<Utc>> for LedgerTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        // timestamp_subsec_nanos is < 2_000_000_000 (leap seconds), which fits i32.
        let nanos = i32::try_from(value.timestamp_subsec_nanos()).unwrap_or(i32::MAX);
        Self { seconds: value.timestamp(), nanos }
    }
}

/// One version in a key's version chain.
///
/// Tombstones (`is_delete == true`) carry an empty `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyModification {
    /// Transaction that committed this version.
    pub tx_id: TxId,

    /// Payload written at this version; empty for tombstones.
    pub value: Bytes,

    /// Whether this version marks a deletion.
    pub is_delete: bool,

    /// Commit time of this version.
    pub timestamp: LedgerTimestamp,
}

impl KeyModification {
    /// Creates a version carrying a payload.
    #[must_use]
    pub fn write(tx_id: TxId, value: Bytes, timestamp: LedgerTimestamp) -> Self {
        Self { tx_id, value, is_delete: false, timestamp }
    }

    /// Creates a tombstone version.
    #[must_use]
    pub fn tombstone(tx_id: TxId, timestamp: LedgerTimestamp) -> Self {
        Self { tx_id, value: Bytes::new(), is_delete: true, timestamp }
    }
}
