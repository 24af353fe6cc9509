//! Key and value size validation.
//!
//! The ledger rejects oversized writes before they are appended, so a single
//! bad payload can never grow a version chain.
//!
//! | Limit | Default |
//! |-------|---------|
//! | `max_key_size` | 512 bytes |
//! | `max_value_size` | 524 288 bytes (512 KiB) |

use serde::{Deserialize, Serialize};

use crate::{ConfigError, StorageError};

/// Default maximum key size in bytes (512 B).
pub const DEFAULT_MAX_KEY_SIZE: usize = 512;

/// Default maximum value size in bytes (512 KiB).
pub const DEFAULT_MAX_VALUE_SIZE: usize = 512 * 1024;

/// Upper bounds on key and value sizes, both at least 1.
///
/// # Example
///
/// ```
/// use vehicle_ledger_storage::SizeLimits;
///
/// let limits = SizeLimits::new(256, 64 * 1024).unwrap();
/// assert_eq!(limits.max_key_size(), 256);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSizeLimits")]
pub struct SizeLimits {
    max_key_size: usize,
    max_value_size: usize,
}

/// Unvalidated wire form, checked through [`SizeLimits::new`].
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSizeLimits {
    #[serde(default = "default_max_key_size")]
    max_key_size: usize,
    #[serde(default = "default_max_value_size")]
    max_value_size: usize,
}

fn default_max_key_size() -> usize {
    DEFAULT_MAX_KEY_SIZE
}

fn default_max_value_size() -> usize {
    DEFAULT_MAX_VALUE_SIZE
}

impl TryFrom<RawSizeLimits> for SizeLimits {
    type Error = ConfigError;

    fn try_from(raw: RawSizeLimits) -> Result<Self, Self::Error> {
        Self::new(raw.max_key_size, raw.max_value_size)
    }
}

impl SizeLimits {
    /// Creates size limits with the given bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BelowMinimum`] if either limit is zero.
    pub fn new(max_key_size: usize, max_value_size: usize) -> Result<Self, ConfigError> {
        if max_key_size == 0 {
            return Err(ConfigError::BelowMinimum {
                field: "max_key_size",
                min: "1".into(),
                value: "0".into(),
            });
        }
        if max_value_size == 0 {
            return Err(ConfigError::BelowMinimum {
                field: "max_value_size",
                min: "1".into(),
                value: "0".into(),
            });
        }
        Ok(Self { max_key_size, max_value_size })
    }

    /// Returns the maximum allowed key size in bytes.
    #[must_use]
    pub fn max_key_size(&self) -> usize {
        self.max_key_size
    }

    /// Returns the maximum allowed value size in bytes.
    #[must_use]
    pub fn max_value_size(&self) -> usize {
        self.max_value_size
    }

    /// Checks a pending write against these limits.
    ///
    /// Tombstones pass an empty value.
    pub fn check(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        if key.len() > self.max_key_size {
            return Err(StorageError::size_limit_exceeded("key", key.len(), self.max_key_size));
        }
        if value.len() > self.max_value_size {
            return Err(StorageError::size_limit_exceeded(
                "value",
                value.len(),
                self.max_value_size,
            ));
        }
        Ok(())
    }
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self { max_key_size: DEFAULT_MAX_KEY_SIZE, max_value_size: DEFAULT_MAX_VALUE_SIZE }
    }
}
