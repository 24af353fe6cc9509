//! Ledger key derivation for vehicle records.
//!
//! Every record lives under `<prefix><registration number>`. Each record kind
//! owns a fixed prefix, and no prefix is a leading substring of another, so
//! keys from different kinds can never collide.
//!
//! | Kind | Prefix | Example key |
//! |------|--------|-------------|
//! | [`RecordKind::Registration`] | `registration_` | `registration_KA01AB1234` |
//! | [`RecordKind::Insurance`] | `insurance_` | `insurance_KA01AB1234` |
//! | [`RecordKind::Service`] | `service_` | `service_KA01AB1234` |
//!
//! These prefixes are part of the stored format and must not change.

use std::fmt;

use crate::error::RecordError;

/// The three vehicle record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    /// Vehicle registration.
    Registration,
    /// Insurance policy.
    Insurance,
    /// Service visit.
    Service,
}

impl RecordKind {
    /// All kinds, in declaration order.
    pub const ALL: [RecordKind; 3] = [Self::Registration, Self::Insurance, Self::Service];

    /// Returns the key prefix for this kind.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Registration => "registration_",
            Self::Insurance => "insurance_",
            Self::Service => "service_",
        }
    }

    /// Returns a short lowercase name, used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::Insurance => "insurance",
            Self::Service => "service",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A derived ledger key: kind prefix followed by the registration number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    kind: RecordKind,
    key: String,
}

impl RecordKey {
    /// Splits a raw ledger key back into kind and identifier.
    #[cfg(test)]
    fn parse(raw: &str) -> Option<Self> {
        RecordKind::ALL.into_iter().find_map(|kind| {
            raw.strip_prefix(kind.prefix())
                .filter(|id| !id.is_empty())
                .map(|_| Self { kind, key: raw.to_owned() })
        })
    }

    /// Returns the record kind this key belongs to.
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Returns the registration number part of the key.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.key[self.kind.prefix().len()..]
    }

    /// Returns the full key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Returns the full key as bytes, the form the ledger stores.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.key.as_bytes()
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Derives the ledger key for `(kind, id)`.
///
/// Pure and deterministic. The identifier is used verbatim, with no
/// trimming or case folding.
///
/// # Errors
///
/// Returns [`RecordError::InvalidIdentifier`] if `id` is empty.
///
/// # Example
///
/// ```
/// use vehicle_ledger::keys::{RecordKind, derive_key};
///
/// let key = derive_key(RecordKind::Service, "KA01AB1234").unwrap();
/// assert_eq!(key.as_str(), "service_KA01AB1234");
/// assert_eq!(key.id(), "KA01AB1234");
/// ```
pub fn derive_key(kind: RecordKind, id: &str) -> Result<RecordKey, RecordError> {
    if id.is_empty() {
        return Err(RecordError::InvalidIdentifier { kind });
    }
    Ok(RecordKey { kind, key: format!("{}{id}", kind.prefix()) })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::registration(RecordKind::Registration, "registration_REG1")]
    #[case::insurance(RecordKind::Insurance, "insurance_REG1")]
    #[case::service(RecordKind::Service, "service_REG1")]
    fn test_key_layout(#[case] kind: RecordKind, #[case] expected: &str) {
        let key = derive_key(kind, "REG1").unwrap();
        assert_eq!(key.as_str(), expected);
        assert_eq!(key.as_bytes(), expected.as_bytes());
        assert_eq!(key.kind(), kind);
        assert_eq!(key.id(), "REG1");
    }

    #[test]
    fn test_empty_identifier_rejected() {
        for kind in RecordKind::ALL {
            let err = derive_key(kind, "").unwrap_err();
            assert!(matches!(err, RecordError::InvalidIdentifier { kind: k } if k == kind));
        }
    }

    #[test]
    fn test_identifier_used_verbatim() {
        let key = derive_key(RecordKind::Registration, " ka 01 ").unwrap();
        assert_eq!(key.as_str(), "registration_ ka 01 ");
    }

    #[test]
    fn test_no_prefix_is_prefix_of_another() {
        for a in RecordKind::ALL {
            for b in RecordKind::ALL {
                if a != b {
                    assert!(!a.prefix().starts_with(b.prefix()), "{a} prefix shadows {b}");
                }
            }
        }
    }

    #[test]
    fn test_parse_rejects_foreign_keys() {
        assert!(RecordKey::parse("owner_REG1").is_none());
        assert!(RecordKey::parse("service_").is_none());
        assert!(RecordKey::parse("").is_none());
    }

    proptest! {
        /// Deriving is deterministic and parsing recovers the inputs.
        #[test]
        fn derive_then_parse_recovers_inputs(kind_idx in 0..3usize, id in ".{1,40}") {
            let kind = RecordKind::ALL[kind_idx];
            let key = derive_key(kind, &id).unwrap();
            prop_assert_eq!(&key, &derive_key(kind, &id).unwrap());

            let parsed = RecordKey::parse(key.as_str()).expect("derived keys always parse");
            prop_assert_eq!(parsed.kind(), kind);
            prop_assert_eq!(parsed.id(), id.as_str());
        }

        /// Distinct `(kind, id)` pairs never share a key.
        #[test]
        fn derivation_is_injective(
            a_kind in 0..3usize,
            a_id in "[A-Za-z0-9_]{1,16}",
            b_kind in 0..3usize,
            b_id in "[A-Za-z0-9_]{1,16}",
        ) {
            let a = derive_key(RecordKind::ALL[a_kind], &a_id).unwrap();
            let b = derive_key(RecordKind::ALL[b_kind], &b_id).unwrap();
            let same_input = a_kind == b_kind && a_id == b_id;
            prop_assert_eq!(a.as_str() == b.as_str(), same_input);
        }
    }
}
