//! Vehicle record types.
//!
//! All fields are required plain strings. JSON field names follow the stored
//! format of the ledger these records live in: registration records use
//! lowerCamelCase, insurance and service records use PascalCase.
//!
//! ```
//! use vehicle_ledger::RegistrationRecord;
//!
//! let record = RegistrationRecord::builder()
//!     .reg_number("REG1")
//!     .chassis_number("CH1")
//!     .engine_number("EN1")
//!     .month_year_of_mfg("01-2020")
//!     .build();
//!
//! let json = serde_json::to_value(&record).unwrap();
//! assert_eq!(json["regNumber"], "REG1");
//! assert_eq!(json["monthYearOfMfg"], "01-2020");
//! ```

use serde::{Deserialize, Serialize};

use crate::{codec::Record, keys::RecordKind};

/// Registration facts of a vehicle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[builder(on(String, into))]
pub struct RegistrationRecord {
    /// Registration number; also the record identifier.
    pub reg_number: String,
    /// Chassis number.
    pub chassis_number: String,
    /// Engine number.
    pub engine_number: String,
    /// Month and year of manufacture, e.g. `01-2020`.
    pub month_year_of_mfg: String,
}

/// Insurance policy attached to a registration number.
///
/// Built with [`InsuranceRecord::builder`], since eight positional strings
/// are easy to transpose:
///
/// ```
/// use vehicle_ledger::InsuranceRecord;
///
/// let policy = InsuranceRecord::builder()
///     .reg_number("REG1")
///     .uin_number("UIN-7")
///     .policy_number("POL-001")
///     .insured_name_and_address("A. Driver, 1 Main St")
///     .contact_number("555-0100")
///     .email_id("driver@example.com")
///     .period_of_cover("2024-01-01/2024-12-31")
///     .premium_details("12000 INR")
///     .build();
///
/// assert_eq!(policy.policy_number, "POL-001");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
#[builder(on(String, into))]
pub struct InsuranceRecord {
    /// Registration number; also the record identifier.
    pub reg_number: String,
    /// Insurer's unique identification number.
    #[serde(rename = "UINNumber")]
    pub uin_number: String,
    /// Policy number.
    pub policy_number: String,
    /// Name and address of the insured party.
    pub insured_name_and_address: String,
    /// Contact phone number.
    pub contact_number: String,
    /// Contact email.
    pub email_id: String,
    /// Period the policy covers.
    pub period_of_cover: String,
    /// Premium details.
    pub premium_details: String,
}

/// A service visit, carrying a full snapshot of the vehicle identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
#[builder(on(String, into))]
pub struct ServiceRecord {
    /// Registration number; also the record identifier.
    pub reg_number: String,
    /// Chassis number.
    pub chassis_number: String,
    /// Engine number.
    pub engine_number: String,
    /// Month and year of manufacture.
    pub month_year_of_mfg: String,
    /// Free-form description of the work done.
    pub service_details: String,
}

impl Record for RegistrationRecord {
    const KIND: RecordKind = RecordKind::Registration;

    fn reg_number(&self) -> &str {
        &self.reg_number
    }
}

impl Record for InsuranceRecord {
    const KIND: RecordKind = RecordKind::Insurance;

    fn reg_number(&self) -> &str {
        &self.reg_number
    }
}

impl Record for ServiceRecord {
    const KIND: RecordKind = RecordKind::Service;

    fn reg_number(&self) -> &str {
        &self.reg_number
    }
}
