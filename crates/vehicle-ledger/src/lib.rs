//! Versioned vehicle records over an append-only ledger.
//!
//! Three record kinds (registration, insurance and service) are stored under
//! deterministic keys derived from the vehicle's registration number. Every
//! write appends a new version; reads see the newest one, and the full
//! version chain can be replayed as an ordered, delete-aware audit log.
//!
//! # Layers
//!
//! | Module | Role |
//! |--------|------|
//! | [`keys`] | `(kind, registration number)` → ledger key |
//! | [`codec`] | record ↔ JSON bytes, strict decode |
//! | [`repository`] | typed set / get / history / delete per kind |
//! | [`history`] | version chain → [`HistoryEntry`] list → JSON audit log |
//! | [`service`] | [`VehicleLedger`], the caller-facing surface |
//!
//! Storage goes through the [`VersionedStore`](vehicle_ledger_storage::VersionedStore)
//! trait from `vehicle-ledger-storage`.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use vehicle_ledger::{InsuranceRecord, VehicleLedger};
//! use vehicle_ledger_storage::MemoryLedger;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ledger = VehicleLedger::new(Arc::new(MemoryLedger::new()));
//!
//!     let policy = |number: &str| {
//!         InsuranceRecord::builder()
//!             .reg_number("REG1")
//!             .uin_number("UIN-7")
//!             .policy_number(number)
//!             .insured_name_and_address("A. Driver")
//!             .contact_number("555-0100")
//!             .email_id("driver@example.com")
//!             .period_of_cover("2024")
//!             .premium_details("12000")
//!             .build()
//!     };
//!
//!     ledger.set_insurance_data(&policy("POL-1")).await?;
//!     ledger.set_insurance_data(&policy("POL-2")).await?;
//!
//!     assert_eq!(ledger.get_insurance_data("REG1").await?.policy_number, "POL-2");
//!
//!     let history = ledger.insurance_history("REG1").await?;
//!     assert_eq!(history.len(), 2);
//!     let first: InsuranceRecord =
//!         serde_json::from_str(history[0].payload().ok_or("writes carry a payload")?)?;
//!     assert_eq!(first.policy_number, "POL-1");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` module with record fixtures.
//! - **`failpoints`**: Enables fail-point injection in the underlying ledger store.

#![deny(unsafe_code)]

pub mod codec;
pub mod config;
pub mod error;
pub mod history;
pub mod keys;
pub mod records;
pub mod repository;
pub mod service;
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use codec::Record;
pub use config::VehicleLedgerConfig;
pub use error::{RecordError, RecordResult};
pub use history::{DeleteFlagFormat, HistoryEntry, render_history};
pub use keys::{RecordKey, RecordKind, derive_key};
pub use records::{InsuranceRecord, RegistrationRecord, ServiceRecord};
pub use repository::RecordRepository;
pub use service::VehicleLedger;
