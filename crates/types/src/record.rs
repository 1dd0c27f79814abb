//! Contribution records and the per-contributor weights derived from them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One measured outcome attached to a contribution record.
///
/// `value` is kept as raw JSON because indexers occasionally emit strings or
/// nulls here; only finite numbers take part in aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReading {
    pub value: serde_json::Value,
    #[serde(default)]
    pub unit: String,
}

impl MetricReading {
    /// Numeric reading with unit.
    pub fn number(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value: serde_json::Number::from_f64(value)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            unit: unit.into(),
        }
    }

    /// The reading as a number, or `None` when it is non-numeric or NaN.
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.as_f64().filter(|v| !v.is_nan())
    }
}

/// A verified unit of work tied to a contributor, as supplied by the indexer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionRecord {
    pub id: String,
    pub work_id: String,
    pub garden_id: String,
    pub contributor_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor_name: Option<String>,
    pub title: String,
    #[serde(default)]
    pub work_scope: Vec<String>,
    /// Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default)]
    pub metrics: BTreeMap<String, MetricReading>,
}

/// Allocation weight inputs for one distinct contributor address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorWeight {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_value: Option<f64>,
}

impl ContributorWeight {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            label: None,
            action_count: None,
            action_value: None,
        }
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.action_count = Some(count);
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.action_value = Some(value);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Contributor statistics are the weights themselves.
pub type ContributorStats = ContributorWeight;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_parses_indexer_json() {
        let json = r#"{
            "id": "att-1",
            "workId": "work-1",
            "gardenId": "garden-9",
            "contributorAddress": "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
            "title": "Planted saplings",
            "workScope": ["planting"],
            "createdAt": 1700000000,
            "metrics": {
                "trees_planted": { "value": 12, "unit": "trees" },
                "notes": { "value": "n/a", "unit": "" }
            }
        }"#;

        let record: ContributionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.work_id, "work-1");
        assert_eq!(record.approved_at, None);
        assert_eq!(record.metrics["trees_planted"].numeric_value(), Some(12.0));
        assert_eq!(record.metrics["notes"].numeric_value(), None);
    }

    #[test]
    fn nan_reading_is_not_numeric() {
        // JSON cannot carry NaN; constructing one yields a null value
        let reading = MetricReading::number(f64::NAN, "kg");
        assert_eq!(reading.numeric_value(), None);
    }
}
