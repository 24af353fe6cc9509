//! Record encoding.
//!
//! Records are stored as JSON. Decoding is strict: the bytes must describe
//! exactly one record of the expected kind, with every field present and no
//! extra fields. Anything else is a [`RecordError::MalformedRecord`]; a
//! default or partially filled record is never returned.

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::{RecordError, RecordResult},
    keys::{RecordKey, RecordKind},
};

/// A record type that can be stored in the ledger.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The key namespace this record type lives in.
    const KIND: RecordKind;

    /// The registration number identifying this record.
    fn reg_number(&self) -> &str;
}

/// Encodes a record to its stored form.
///
/// # Errors
///
/// Returns [`RecordError::Encoding`] if serialization fails.
pub fn encode<R: Record>(record: &R) -> RecordResult<Vec<u8>> {
    serde_json::to_vec(record).map_err(|source| RecordError::Encoding { kind: R::KIND, source })
}

/// Decodes the bytes stored at `key`.
///
/// # Errors
///
/// Returns [`RecordError::MalformedRecord`] if the bytes are not exactly a
/// record of type `R`.
pub fn decode<R: Record>(key: &RecordKey, bytes: &[u8]) -> RecordResult<R> {
    serde_json::from_slice(bytes).map_err(|source| {
        tracing::warn!(key = %key, error = %source, "stored record failed to decode");
        RecordError::MalformedRecord { key: key.to_string(), source }
    })
}
