//! Service configuration.

use serde::{Deserialize, Serialize};

use crate::history::DeleteFlagFormat;

/// Configuration for [`VehicleLedger`](crate::VehicleLedger).
///
/// # Example
///
/// ```
/// use vehicle_ledger::{DeleteFlagFormat, VehicleLedgerConfig};
///
/// let config = VehicleLedgerConfig::builder()
///     .delete_flag(DeleteFlagFormat::Boolean)
///     .log_history_payloads(true)
///     .build();
///
/// assert_eq!(config.delete_flag(), DeleteFlagFormat::Boolean);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VehicleLedgerConfig {
    /// How `IsDelete` is rendered in history JSON.
    #[serde(default)]
    delete_flag: DeleteFlagFormat,

    /// Log each rendered history document at `debug`.
    #[serde(default)]
    log_history_payloads: bool,
}

#[bon::bon]
impl VehicleLedgerConfig {
    /// Creates a new configuration.
    ///
    /// # Optional Fields
    ///
    /// * `delete_flag` - `IsDelete` rendering (default: [`DeleteFlagFormat::String`]).
    /// * `log_history_payloads` - Log rendered histories (default: `false`).
    #[builder]
    pub fn new(
        #[builder(default)] delete_flag: DeleteFlagFormat,
        #[builder(default)] log_history_payloads: bool,
    ) -> Self {
        Self { delete_flag, log_history_payloads }
    }

    /// Returns the `IsDelete` rendering.
    #[must_use]
    pub fn delete_flag(&self) -> DeleteFlagFormat {
        self.delete_flag
    }

    /// Returns whether rendered histories are logged.
    #[must_use]
    pub fn log_history_payloads(&self) -> bool {
        self.log_history_payloads
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_default_impl() {
        assert_eq!(VehicleLedgerConfig::builder().build(), VehicleLedgerConfig::default());
    }

    #[test]
    fn test_deserialization() {
        let config: VehicleLedgerConfig =
            serde_json::from_str(r#"{"delete_flag": "boolean"}"#).unwrap();
        assert_eq!(config.delete_flag(), DeleteFlagFormat::Boolean);
        assert!(!config.log_history_payloads());

        let empty: VehicleLedgerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, VehicleLedgerConfig::default());
    }

    #[test]
    fn test_deserialization_rejects_unknown_fields() {
        let result = serde_json::from_str::<VehicleLedgerConfig>(r#"{"is_delete": "string"}"#);
        assert!(result.is_err());
    }
}
