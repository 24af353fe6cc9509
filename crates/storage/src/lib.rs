//! Versioned ledger store abstraction for vehicle lifecycle records.
//!
//! This crate provides the [`VersionedStore`] trait and related types that
//! form the boundary between the vehicle record core and the ledger
//! substrate. The substrate owns ordering, consensus and persistence; the
//! core only reads the latest value of a key, appends new versions, and walks
//! a key's version chain.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Service Layer                            │
//! │       (VehicleLedger: registration / insurance / service)   │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   Repository Layer                          │
//! │   RecordRepository<R> (key derivation, JSON codec, history) │
//! ├─────────────────────────────────────────────────────────────┤
//! │                 vehicle-ledger-storage                      │
//! │              VersionedStore trait                           │
//! │    (get, put, delete, history, transaction)                 │
//! ├──────────────┬──────────────────────────────────────────────┤
//! │ MemoryLedger │        ledger substrate adapters             │
//! │   (testing)  │        (outside this workspace)              │
//! └──────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use vehicle_ledger_storage::{MemoryLedger, ScopedHistory, VersionedStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ledger = MemoryLedger::new();
//!
//!     // Every write appends a version and returns its transaction id
//!     let first = ledger.put(b"registration_KA01".to_vec(), b"v1".to_vec()).await?;
//!     ledger.put(b"registration_KA01".to_vec(), b"v2".to_vec()).await?;
//!
//!     // Reads see the newest version only
//!     let value = ledger.get(b"registration_KA01").await?;
//!     assert_eq!(value.map(|b| b.to_vec()), Some(b"v2".to_vec()));
//!
//!     // History yields the full chain, oldest first
//!     let mut cursor = ScopedHistory::new(ledger.history(b"registration_KA01").await?);
//!     let oldest = cursor.next().await?.expect("two versions");
//!     assert_eq!(oldest.tx_id, first);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Available Stores
//!
//! | Store | Use Case | Persistence |
//! |-------|----------|-------------|
//! | [`MemoryLedger`] | Testing, development | No |
//!
//! # Error Handling
//!
//! All operations return [`StorageResult<T>`]. Substrate adapters map their
//! internal errors onto [`StorageError`] variants.
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` and `conformance` modules (key/value generators, a
//!   failure-injecting store wrapper, and the store conformance suite). Enable this in
//!   `[dev-dependencies]` for integration tests.
//! - **`failpoints`**: Compiles in `fail` injection points (`history-next`,
//!   `ledger-before-commit`, `health-check`).

#![deny(unsafe_code)]

pub mod backend;
pub mod config;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used)]
pub mod conformance;
pub mod error;
pub mod iterator;
pub mod memory;
pub mod size_limits;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used)]
pub mod testutil;
pub mod transaction;
pub mod types;

// Re-export primary types at crate root for convenience
pub use backend::VersionedStore;
pub use config::{DEFAULT_LEDGER_NAME, MemoryLedgerConfig};
pub use error::{BoxError, ConfigError, StorageError, StorageResult};
pub use iterator::{HistoryIterator, ScopedHistory};
pub use memory::MemoryLedger;
pub use size_limits::{DEFAULT_MAX_KEY_SIZE, DEFAULT_MAX_VALUE_SIZE, SizeLimits};
pub use transaction::LedgerTransaction;
pub use types::{KeyModification, LedgerTimestamp, TxId};
