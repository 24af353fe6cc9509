//! Record-level error types.
//!
//! [`RecordError`] is what callers of the repositories and of
//! [`VehicleLedger`](crate::VehicleLedger) see. Substrate failures arrive as
//! [`StorageError`] and are wrapped with the key and the stage (write, read,
//! history walk) they happened in; codec failures keep the `serde_json`
//! error as their source.
//!
//! | Variant | Remediation |
//! |---------|-------------|
//! | [`NotFound`](RecordError::NotFound) | write the record first |
//! | [`InvalidIdentifier`](RecordError::InvalidIdentifier) | fix the request |
//! | [`MalformedRecord`](RecordError::MalformedRecord) | stored bytes are corrupt; investigate |
//! | [`Encoding`](RecordError::Encoding) | bug; should not happen for plain-string records |
//! | [`StoreWrite`](RecordError::StoreWrite) / [`StoreRead`](RecordError::StoreRead) / [`HistoryRead`](RecordError::HistoryRead) | retry if [`is_transient`](RecordError::is_transient) |

use thiserror::Error;
use vehicle_ledger_storage::StorageError;

use crate::keys::RecordKind;

/// Result type alias for record operations.
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors from record operations.
///
/// # Non-exhaustive
///
/// New variants may be added without a semver-breaking change. Downstream
/// match expressions must include a wildcard arm.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecordError {
    /// No live version exists for the record.
    #[error("{kind} record {id} does not exist")]
    NotFound {
        /// Record kind that was looked up.
        kind: RecordKind,
        /// Registration number that was looked up.
        id: String,
    },

    /// Stored bytes do not decode into the expected record shape.
    #[error("malformed record at {key}: {source}")]
    MalformedRecord {
        /// Ledger key holding the bad bytes.
        key: String,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// A record (or rendered history) could not be encoded.
    #[error("failed to encode {kind} record: {source}")]
    Encoding {
        /// Record kind being encoded.
        kind: RecordKind,
        /// Encoder error.
        #[source]
        source: serde_json::Error,
    },

    /// The ledger rejected a write.
    #[error("failed to write {key}: {source}")]
    StoreWrite {
        /// Ledger key being written.
        key: String,
        /// Substrate error.
        #[source]
        source: StorageError,
    },

    /// The ledger failed to serve a latest-value read.
    #[error("failed to read {key}: {source}")]
    StoreRead {
        /// Ledger key being read.
        key: String,
        /// Substrate error.
        #[source]
        source: StorageError,
    },

    /// The ledger failed while a version chain was being walked.
    ///
    /// No partial history is returned alongside this error.
    #[error("failed to read history of {key}: {source}")]
    HistoryRead {
        /// Ledger key whose chain was being walked.
        key: String,
        /// Substrate error.
        #[source]
        source: StorageError,
    },

    /// The registration number was empty.
    #[error("{kind} registration number must not be empty")]
    InvalidIdentifier {
        /// Record kind the identifier was meant for.
        kind: RecordKind,
    },
}

impl RecordError {
    /// Returns `true` if the record has no live version.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if stored bytes failed to decode.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedRecord { .. })
    }

    /// Returns `true` if retrying the operation may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.storage_source().is_some_and(StorageError::is_transient)
    }

    /// Returns the substrate error behind a store failure, if any.
    #[must_use]
    pub fn storage_source(&self) -> Option<&StorageError> {
        match self {
            Self::StoreWrite { source, .. }
            | Self::StoreRead { source, .. }
            | Self::HistoryRead { source, .. } => Some(source),
            _ => None,
        }
    }
}
