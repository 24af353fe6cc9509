//! Storage error types and result alias.
//!
//! Every [`VersionedStore`](crate::VersionedStore) implementation maps its
//! internal failures onto [`StorageError`], so callers see one taxonomy no
//! matter which ledger substrate sits underneath.
//!
//! # Error Types
//!
//! - [`StorageError::Conflict`] - The substrate rejected a concurrent commit
//! - [`StorageError::Connection`] - The substrate could not be reached
//! - [`StorageError::Serialization`] - Bytes could not be encoded or decoded
//! - [`StorageError::Internal`] - Substrate-specific failure
//! - [`StorageError::Timeout`] - Operation exceeded its time limit
//! - [`StorageError::SizeLimitExceeded`] - Key or value is too large
//! - [`StorageError::IteratorClosed`] - A history iterator was used after close
//!
//! Absence is not an error: [`VersionedStore::get`](crate::VersionedStore::get)
//! returns `Ok(None)` for a key with no live version.
//!
//! # Example
//!
//! ```
//! use vehicle_ledger_storage::{StorageError, StorageResult};
//!
//! fn submit(peer_up: bool) -> StorageResult<()> {
//!     if peer_up { Ok(()) } else { Err(StorageError::connection("orderer unreachable")) }
//! }
//!
//! let err = submit(false).unwrap_err();
//! assert!(err.is_transient());
//! ```

use std::sync::Arc;

use thiserror::Error;

/// A boxed error type for source chain tracking.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while talking to the ledger substrate.
///
/// Errors preserve their source chain via `#[source]`, so the full context
/// survives the trip up through the repository layer.
///
/// # Non-exhaustive
///
/// New variants may be added without a semver-breaking change. Downstream
/// match expressions must include a wildcard arm.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// The substrate aborted the commit because of a concurrent writer.
    #[error("Transaction conflict")]
    Conflict,

    /// The substrate could not be reached.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
        /// The underlying error that caused this connection failure.
        #[source]
        source: Option<BoxError>,
    },

    /// Bytes could not be encoded for, or decoded from, the substrate.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the serialization error.
        message: String,
        /// The underlying error that caused serialization to fail.
        #[source]
        source: Option<BoxError>,
    },

    /// Catch-all for substrate-specific failures.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
        /// The underlying error that caused this internal failure.
        #[source]
        source: Option<BoxError>,
    },

    /// Operation timed out.
    #[error("Operation timeout")]
    Timeout,

    /// A key or value exceeded the configured size limit.
    #[error("{kind} size {actual} exceeds limit of {limit} bytes")]
    SizeLimitExceeded {
        /// Which part of the write was too large (`"key"` or `"value"`).
        kind: String,
        /// Actual size in bytes.
        actual: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// A history iterator was advanced after it had been closed.
    #[error("History iterator already closed")]
    IteratorClosed,
}

impl StorageError {
    /// Creates a new `Conflict` error.
    #[must_use]
    pub fn conflict() -> Self {
        Self::Conflict
    }

    /// Creates a new `Connection` error with the given message.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into(), source: None }
    }

    /// Creates a new `Serialization` error with the given message.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization { message: message.into(), source: None }
    }

    /// Creates a new `Serialization` error with a message and source error.
    #[must_use]
    pub fn serialization_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Serialization { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Internal` error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Creates a new `Timeout` error.
    #[must_use]
    pub fn timeout() -> Self {
        Self::Timeout
    }

    /// Creates a new `SizeLimitExceeded` error.
    #[must_use]
    pub fn size_limit_exceeded(kind: impl Into<String>, actual: usize, limit: usize) -> Self {
        Self::SizeLimitExceeded { kind: kind.into(), actual, limit }
    }

    /// Returns `true` if retrying the same operation may succeed.
    ///
    /// Connection failures, timeouts and conflicts are transient; everything
    /// else will fail the same way again.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout | Self::Conflict)
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required string field was empty.
    #[error("{field} cannot be empty")]
    Empty {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A numeric field was below its allowed minimum.
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        /// Name of the offending field.
        field: &'static str,
        /// Minimum allowed value.
        min: String,
        /// Value that was supplied.
        value: String,
    },
}
