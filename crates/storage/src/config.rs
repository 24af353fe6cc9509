//! Configuration for the in-memory ledger.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, size_limits::SizeLimits};

/// Default ledger (channel) name.
pub const DEFAULT_LEDGER_NAME: &str = "vehicle-channel";

/// Configuration for [`MemoryLedger`](crate::MemoryLedger).
///
/// The ledger name is mixed into every transaction id, so two ledgers with
/// different names never issue the same id for the same commit.
///
/// # Example
///
/// ```
/// use vehicle_ledger_storage::{MemoryLedgerConfig, SizeLimits};
///
/// let config = MemoryLedgerConfig::builder()
///     .name("rto-karnataka")
///     .size_limits(SizeLimits::new(128, 16 * 1024)?)
///     .build()?;
///
/// assert_eq!(config.name(), "rto-karnataka");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryLedgerConfig {
    /// Ledger (channel) name.
    #[serde(default = "default_name")]
    pub(crate) name: String,

    /// Write size limits.
    #[serde(default)]
    pub(crate) size_limits: SizeLimits,
}

fn default_name() -> String {
    DEFAULT_LEDGER_NAME.to_owned()
}

#[bon::bon]
impl MemoryLedgerConfig {
    /// Creates a new configuration.
    ///
    /// # Optional Fields
    ///
    /// * `name` - Ledger name (default: `"vehicle-channel"`).
    /// * `size_limits` - Write size limits (default: [`SizeLimits::default`]).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] if `name` is empty.
    #[builder]
    pub fn new(
        #[builder(into, default = default_name())] name: String,
        #[builder(default)] size_limits: SizeLimits,
    ) -> Result<Self, ConfigError> {
        let config = Self { name, size_limits };
        config.validate()?;
        Ok(config)
    }

    /// Re-checks invariants; used after deserialization.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] if `name` is empty or whitespace.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Empty { field: "name" });
        }
        Ok(())
    }

    /// Returns the ledger name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the write size limits.
    #[must_use]
    pub fn size_limits(&self) -> SizeLimits {
        self.size_limits
    }
}

impl Default for MemoryLedgerConfig {
    fn default() -> Self {
        Self { name: default_name(), size_limits: SizeLimits::default() }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_default_impl() {
        let built = MemoryLedgerConfig::builder().build().unwrap();
        assert_eq!(built, MemoryLedgerConfig::default());
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = MemoryLedgerConfig::builder().name("  ").build();
        assert_eq!(result, Err(ConfigError::Empty { field: "name" }));
    }

    #[test]
    fn test_deserialization_with_defaults() {
        let config: MemoryLedgerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.name(), DEFAULT_LEDGER_NAME);
        assert_eq!(config.size_limits(), SizeLimits::default());
    }

    #[test]
    fn test_deserialization_rejects_unknown_fields() {
        let result = serde_json::from_str::<MemoryLedgerConfig>(r#"{"channel": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialized_empty_name_fails_validation() {
        let config: MemoryLedgerConfig = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert!(config.validate().is_err());
    }
}
