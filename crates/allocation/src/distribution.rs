//! Unit distribution
//!
//! Turns contributor weights into an integer allocation that sums to exactly
//! [`TOTAL_UNITS`]. No floating point takes part in the split:
//!
//! - **Equal**: `TOTAL_UNITS / N` each, remainder handed out one unit at a time
//! - **ByCount / ByValue**: `floor(TOTAL_UNITS * w_i / sum(w))`, remainder
//!   handed out by descending weight (ties keep input order), cycling if needed.
//!   Value weights are the exact binary values of the `f64` inputs.
//! - **Custom**: caller-supplied entries, checked for conservation only
//!
//! Identical ordered inputs always produce the identical allocation.

use crate::allowlist::{check_conservation, sum_units};
use crate::errors::{AllocationError, Result};
use impact_types::{AllocationEntry, ContributorWeight, Units, TOTAL_UNITS};
use num_bigint::BigUint;
use num_traits::{Float, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Allocation policy, as named by loosely-typed callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionMode {
    Equal,
    ByCount,
    ByValue,
    Custom,
}

impl FromStr for DistributionMode {
    type Err = AllocationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equal" => Ok(DistributionMode::Equal),
            // "proportional" is the historical name of count weighting
            "count" | "by_count" | "bycount" | "proportional" => Ok(DistributionMode::ByCount),
            "value" | "by_value" | "byvalue" => Ok(DistributionMode::ByValue),
            "custom" => Ok(DistributionMode::Custom),
            other => Err(AllocationError::UnknownMode(other.to_string())),
        }
    }
}

/// A distribution request: the policy and exactly the payload it needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistributionRequest<'a> {
    Equal(&'a [ContributorWeight]),
    ByCount(&'a [ContributorWeight]),
    ByValue(&'a [ContributorWeight]),
    Custom(&'a [AllocationEntry]),
}

impl<'a> DistributionRequest<'a> {
    /// Build a request from a mode flag plus an optional custom payload.
    pub fn from_mode(
        mode: DistributionMode,
        contributors: &'a [ContributorWeight],
        custom: Option<&'a [AllocationEntry]>,
    ) -> Result<Self> {
        Ok(match mode {
            DistributionMode::Equal => DistributionRequest::Equal(contributors),
            DistributionMode::ByCount => DistributionRequest::ByCount(contributors),
            DistributionMode::ByValue => DistributionRequest::ByValue(contributors),
            DistributionMode::Custom => {
                DistributionRequest::Custom(custom.ok_or(AllocationError::MissingCustomEntries)?)
            }
        })
    }

    pub fn mode(&self) -> DistributionMode {
        match self {
            DistributionRequest::Equal(_) => DistributionMode::Equal,
            DistributionRequest::ByCount(_) => DistributionMode::ByCount,
            DistributionRequest::ByValue(_) => DistributionMode::ByValue,
            DistributionRequest::Custom(_) => DistributionMode::Custom,
        }
    }
}

/// Allocate [`TOTAL_UNITS`] according to `request`.
pub fn distribute(request: DistributionRequest<'_>) -> Result<Vec<AllocationEntry>> {
    let entries = match request {
        DistributionRequest::Equal(contributors) => distribute_equal(contributors, TOTAL_UNITS)?,
        DistributionRequest::ByCount(contributors) => {
            let weights = contributors.iter().map(count_weight).collect();
            distribute_weighted(contributors, weights, TOTAL_UNITS)?
        }
        DistributionRequest::ByValue(contributors) => {
            distribute_weighted(contributors, value_weights(contributors), TOTAL_UNITS)?
        }
        DistributionRequest::Custom(entries) => {
            if entries.is_empty() {
                return Err(AllocationError::MissingCustomEntries);
            }
            check_conservation(entries)?;
            entries.to_vec()
        }
    };

    info!(
        mode = ?request.mode(),
        recipients = entries.len(),
        total_units = %sum_units(&entries),
        "allocation computed"
    );
    Ok(entries)
}

/// Weight for count-based distribution: `max(0, action_count)`.
pub fn count_weight(contributor: &ContributorWeight) -> BigUint {
    let count = contributor.action_count.unwrap_or(0).max(0);
    BigUint::from(count as u64)
}

/// Weights for value-based distribution: `max(0, action_value)`, exactly.
///
/// A finite `f64` is `mantissa * 2^exponent`. Every positive value is
/// rescaled to the smallest exponent present, which keeps all ratios between
/// weights exact. Missing, negative and non-finite values weigh zero.
pub fn value_weights(contributors: &[ContributorWeight]) -> Vec<BigUint> {
    let decoded: Vec<Option<(u64, i16)>> = contributors
        .iter()
        .map(|c| {
            c.action_value
                .filter(|v| v.is_finite() && *v > 0.0)
                .map(|v| {
                    let (mantissa, exponent, _sign) = Float::integer_decode(v);
                    (mantissa, exponent)
                })
        })
        .collect();

    let Some(min_exponent) = decoded.iter().flatten().map(|(_, e)| *e).min() else {
        return vec![BigUint::zero(); contributors.len()];
    };

    decoded
        .into_iter()
        .map(|d| match d {
            Some((mantissa, exponent)) => {
                BigUint::from(mantissa) << usize::from((exponent - min_exponent).unsigned_abs())
            }
            None => BigUint::zero(),
        })
        .collect()
}

fn distribute_equal(contributors: &[ContributorWeight], total: Units) -> Result<Vec<AllocationEntry>> {
    if contributors.is_empty() {
        return Err(AllocationError::EmptyContributorSet);
    }

    let n = contributors.len() as Units;
    let base = total / n;
    let mut units = vec![base; contributors.len()];
    let remainder = total - base * n;

    let weights = vec![BigUint::from(1u8); contributors.len()];
    assign_remainder(&mut units, &weights, remainder);

    Ok(to_entries(contributors, units))
}

fn distribute_weighted(
    contributors: &[ContributorWeight],
    weights: Vec<BigUint>,
    total: Units,
) -> Result<Vec<AllocationEntry>> {
    if contributors.is_empty() {
        return Err(AllocationError::EmptyContributorSet);
    }

    let total_weight: BigUint = weights.iter().sum();
    if total_weight.is_zero() {
        warn!(
            contributors = contributors.len(),
            "all contributor weights are zero, falling back to equal split"
        );
        return distribute_equal(contributors, total);
    }

    let total_big = BigUint::from(total);
    let mut units = Vec::with_capacity(weights.len());
    for weight in &weights {
        let share = (&total_big * weight) / &total_weight;
        units.push(
            share
                .to_u128()
                .ok_or(AllocationError::ArithmeticOverflow("proportional share"))?,
        );
    }

    let distributed: Units = units.iter().sum();
    let remainder = total
        .checked_sub(distributed)
        .ok_or(AllocationError::ArithmeticOverflow("distribution remainder"))?;
    assign_remainder(&mut units, &weights, remainder);

    Ok(to_entries(contributors, units))
}

/// Hand out `remainder` single units by descending weight, cycling through
/// the ordering when the remainder exceeds the number of recipients.
fn assign_remainder(units: &mut [Units], weights: &[BigUint], remainder: Units) {
    if remainder == 0 || units.is_empty() {
        return;
    }

    let mut order: Vec<usize> = (0..units.len()).collect();
    // sort_by is stable: equal weights keep input order
    order.sort_by(|&a, &b| weights[b].cmp(&weights[a]));

    let n = units.len() as Units;
    let full_rounds = remainder / n;
    let extra = (remainder % n) as usize;

    for (rank, &idx) in order.iter().enumerate() {
        units[idx] += full_rounds + Units::from(rank < extra);
    }

    debug!(
        remainder = %remainder,
        recipients = units.len(),
        "remainder units assigned"
    );
}

fn to_entries(contributors: &[ContributorWeight], units: Vec<Units>) -> Vec<AllocationEntry> {
    contributors
        .iter()
        .zip(units)
        .map(|(c, u)| AllocationEntry::new(c.address.clone(), u).with_label(c.label.clone()))
        .collect()
}
