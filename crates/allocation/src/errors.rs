use impact_types::{AddressError, Units};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of allocation failures.
///
/// Every kind signals malformed caller input; none is transient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Input,
    Conservation,
    Value,
    NotFound,
}

/// Errors raised while allocating, validating or committing units.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocationError {
    #[error("no contributors supplied for distribution")]
    EmptyContributorSet,

    #[error("allowlist is empty")]
    EmptyAllowlist,

    #[error("custom distribution requires at least one allocation entry")]
    MissingCustomEntries,

    #[error("allocation sums to {actual} units, expected exactly {expected}")]
    ConservationViolation { expected: Units, actual: BigUint },

    #[error("entry for {address} has non-positive units")]
    NonPositiveUnits { address: String },

    #[error("invalid account address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddressError,
    },

    #[error("address {address} appears more than once after normalisation")]
    DuplicateAddress { address: String },

    #[error("no leaf for ({address}, {units}) in the committed tree")]
    EntryNotFound { address: String, units: Units },

    #[error("arithmetic overflow while computing {0}")]
    ArithmeticOverflow(&'static str),

    #[error("unknown distribution mode {0:?}")]
    UnknownMode(String),
}

impl AllocationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AllocationError::EmptyContributorSet
            | AllocationError::EmptyAllowlist
            | AllocationError::MissingCustomEntries
            | AllocationError::UnknownMode(_) => ErrorKind::Input,
            AllocationError::ConservationViolation { .. } => ErrorKind::Conservation,
            AllocationError::NonPositiveUnits { .. }
            | AllocationError::InvalidAddress { .. }
            | AllocationError::DuplicateAddress { .. }
            | AllocationError::ArithmeticOverflow(_) => ErrorKind::Value,
            AllocationError::EntryNotFound { .. } => ErrorKind::NotFound,
        }
    }
}

pub type Result<T> = std::result::Result<T, AllocationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(AllocationError::EmptyContributorSet.kind(), ErrorKind::Input);
        assert_eq!(AllocationError::MissingCustomEntries.kind(), ErrorKind::Input);
        assert_eq!(
            AllocationError::ConservationViolation {
                expected: 10,
                actual: BigUint::from(9u8),
            }
            .kind(),
            ErrorKind::Conservation
        );
        assert_eq!(
            AllocationError::NonPositiveUnits { address: "0x0".into() }.kind(),
            ErrorKind::Value
        );
        assert_eq!(
            AllocationError::EntryNotFound { address: "0x0".into(), units: 1 }.kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn conservation_message_reports_both_sums() {
        let err = AllocationError::ConservationViolation {
            expected: 100_000_000,
            actual: BigUint::from(99_999_999u32),
        };
        assert_eq!(
            err.to_string(),
            "allocation sums to 99999999 units, expected exactly 100000000"
        );
    }
}
