//! Allowlist validation
//!
//! A validated allowlist is non-empty, conserves [`TOTAL_UNITS`] exactly and
//! gives every entry at least one unit.

use crate::errors::{AllocationError, Result};
use impact_types::{AllocationEntry, TOTAL_UNITS};
use num_bigint::BigUint;
use serde::Serialize;
use std::ops::Deref;

/// Sum of all entry units, without overflow.
pub fn sum_units(entries: &[AllocationEntry]) -> BigUint {
    entries.iter().map(|e| BigUint::from(e.units)).sum()
}

/// Fail with `ConservationViolation` unless the entries sum to [`TOTAL_UNITS`].
pub fn check_conservation(entries: &[AllocationEntry]) -> Result<()> {
    let actual = sum_units(entries);
    if actual != BigUint::from(TOTAL_UNITS) {
        return Err(AllocationError::ConservationViolation {
            expected: TOTAL_UNITS,
            actual,
        });
    }
    Ok(())
}

/// Check an allocation for structural correctness.
///
/// Checks run in a fixed order: emptiness, conservation, positivity.
pub fn validate_allowlist(entries: &[AllocationEntry]) -> Result<()> {
    if entries.is_empty() {
        return Err(AllocationError::EmptyAllowlist);
    }
    check_conservation(entries)?;
    if let Some(entry) = entries.iter().find(|e| e.units == 0) {
        return Err(AllocationError::NonPositiveUnits {
            address: entry.address.clone(),
        });
    }
    Ok(())
}

/// Allowlist that has passed [`validate_allowlist`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidatedAllowlist(Vec<AllocationEntry>);

impl ValidatedAllowlist {
    pub fn new(entries: Vec<AllocationEntry>) -> Result<Self> {
        validate_allowlist(&entries)?;
        Ok(Self(entries))
    }

    pub fn entries(&self) -> &[AllocationEntry] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<AllocationEntry> {
        self.0
    }
}

impl Deref for ValidatedAllowlist {
    type Target = [AllocationEntry];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<Vec<AllocationEntry>> for ValidatedAllowlist {
    type Error = AllocationError;

    fn try_from(entries: Vec<AllocationEntry>) -> Result<Self> {
        Self::new(entries)
    }
}
