//! Record aggregation
//!
//! Reduces raw contribution records into per-contributor weights, summed
//! outcome metrics and the observed work timeframe. All reductions walk the
//! records in input order, so "first" always means first in the slice.

use impact_types::{ContributionRecord, ContributorStats};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Metric key that always carries the number of aggregated records.
pub const ATTESTATION_COUNT_KEY: &str = "attestation_count";

/// How an aggregated metric was reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationKind {
    Sum,
    Count,
}

/// One metric reduced across all records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetric {
    pub value: f64,
    pub unit: String,
    pub aggregation: AggregationKind,
    pub label: String,
}

/// Outcome block of a certificate: predefined (aggregated) and free-form metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeMetrics {
    #[serde(default)]
    pub predefined: BTreeMap<String, AggregatedMetric>,
    #[serde(default)]
    pub custom: BTreeMap<String, serde_json::Value>,
}

/// Earliest start and latest end observed across records (unix seconds).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkTimeframe {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

/// `trees_planted` -> `Trees Planted`.
pub fn titleize(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut out = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    for c in spaced.chars() {
        if at_word_start && c.is_alphanumeric() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !c.is_alphanumeric();
    }
    out
}

/// Sum every numeric metric across records, keyed by metric name.
///
/// Non-numeric and NaN readings are skipped. The unit of a key is fixed by its
/// first numeric occurrence. `attestation_count` is always present.
pub fn aggregate_outcome_metrics(records: &[ContributionRecord]) -> OutcomeMetrics {
    let mut predefined: BTreeMap<String, AggregatedMetric> = BTreeMap::new();

    for record in records {
        for (key, reading) in &record.metrics {
            let Some(value) = reading.numeric_value() else {
                debug!(record = %record.id, metric = %key, "skipping non-numeric metric");
                continue;
            };

            predefined
                .entry(key.clone())
                .and_modify(|metric| metric.value += value)
                .or_insert_with(|| AggregatedMetric {
                    value,
                    unit: reading.unit.clone(),
                    aggregation: AggregationKind::Sum,
                    label: titleize(key),
                });
        }
    }

    predefined.insert(
        ATTESTATION_COUNT_KEY.to_string(),
        AggregatedMetric {
            value: records.len() as f64,
            unit: "count".to_string(),
            aggregation: AggregationKind::Count,
            label: titleize(ATTESTATION_COUNT_KEY),
        },
    );

    OutcomeMetrics {
        predefined,
        custom: BTreeMap::new(),
    }
}

/// Group records by contributor address (case-insensitive) in first-seen order.
///
/// `action_count` is the record count, `action_value` the sum of all numeric
/// metric values, `label` the first non-empty contributor name.
pub fn build_contributor_stats(records: &[ContributionRecord]) -> Vec<ContributorStats> {
    let mut stats: Vec<ContributorStats> = Vec::new();
    let mut index_by_address: HashMap<String, usize> = HashMap::new();

    for record in records {
        let key = record.contributor_address.to_ascii_lowercase();
        let idx = *index_by_address.entry(key).or_insert_with(|| {
            stats.push(ContributorStats {
                address: record.contributor_address.clone(),
                label: None,
                action_count: Some(0),
                action_value: Some(0.0),
            });
            stats.len() - 1
        });

        let entry = &mut stats[idx];
        entry.action_count = Some(entry.action_count.unwrap_or(0) + 1);

        let record_value: f64 = record
            .metrics
            .values()
            .filter_map(|reading| reading.numeric_value())
            .sum();
        entry.action_value = Some(entry.action_value.unwrap_or(0.0) + record_value);

        if entry.label.is_none() {
            entry.label = record
                .contributor_name
                .as_ref()
                .filter(|name| !name.trim().is_empty())
                .cloned();
        }
    }

    debug!(
        records = records.len(),
        contributors = stats.len(),
        "built contributor stats"
    );
    stats
}

/// Earliest `created_at` (else `approved_at`) and latest `approved_at`
/// (else `created_at`) across records.
pub fn derive_work_timeframe(records: &[ContributionRecord]) -> WorkTimeframe {
    let start = records
        .iter()
        .filter_map(|r| r.created_at.or(r.approved_at))
        .min();
    let end = records
        .iter()
        .filter_map(|r| r.approved_at.or(r.created_at))
        .max();

    match (start, end) {
        (Some(start), Some(end)) => WorkTimeframe {
            start: Some(start),
            end: Some(end),
        },
        _ => WorkTimeframe::default(),
    }
}

/// Union of record work scopes, first-seen order, duplicates dropped.
pub fn collect_work_scope(records: &[ContributionRecord]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .flat_map(|r| r.work_scope.iter())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_string()))
        .map(str::to_string)
        .collect()
}

/// Distinct contributor addresses in first-seen order (case-insensitive).
pub fn unique_contributors(records: &[ContributionRecord]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.contributor_address.to_ascii_lowercase()))
        .map(|r| r.contributor_address.clone())
        .collect()
}
