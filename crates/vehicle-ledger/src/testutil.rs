//! Record fixtures for tests and benchmarks.
//!
//! Feature-gated behind `testutil`.
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use vehicle_ledger::testutil::{memory_vehicle_ledger, sample_insurance};
//! ```

use std::sync::Arc;

use vehicle_ledger_storage::MemoryLedger;

use crate::{
    records::{InsuranceRecord, RegistrationRecord, ServiceRecord},
    service::VehicleLedger,
};

/// A [`VehicleLedger`] over a fresh [`MemoryLedger`], plus a handle to that
/// ledger for inspecting version chains and open cursors.
#[must_use]
pub fn memory_vehicle_ledger() -> (VehicleLedger, MemoryLedger) {
    let ledger = MemoryLedger::new();
    (VehicleLedger::new(Arc::new(ledger.clone())), ledger)
}

/// Registration record with fixed chassis and engine numbers.
#[must_use]
pub fn sample_registration(reg_number: &str) -> RegistrationRecord {
    RegistrationRecord::builder()
        .reg_number(reg_number)
        .chassis_number("MA3EWDE1S00123456")
        .engine_number("K12MN1234567")
        .month_year_of_mfg("03-2021")
        .build()
}

/// Insurance record for `reg_number` under `policy_number`.
#[must_use]
pub fn sample_insurance(reg_number: &str, policy_number: &str) -> InsuranceRecord {
    InsuranceRecord::builder()
        .reg_number(reg_number)
        .uin_number("IRDAN123RP0001V01201920")
        .policy_number(policy_number)
        .insured_name_and_address("R. Kumar, 12 MG Road, Bengaluru")
        .contact_number("+91-80-5550-0100")
        .email_id("rkumar@example.com")
        .period_of_cover("2024-04-01/2025-03-31")
        .premium_details("INR 11,840 incl. GST")
        .build()
}

/// Service record for `reg_number` with the given work description.
#[must_use]
pub fn sample_service(reg_number: &str, service_details: &str) -> ServiceRecord {
    ServiceRecord::builder()
        .reg_number(reg_number)
        .chassis_number("MA3EWDE1S00123456")
        .engine_number("K12MN1234567")
        .month_year_of_mfg("03-2021")
        .service_details(service_details)
        .build()
}
