//! Allocation entries: who receives how many units

use crate::units::{units_serde, Units};
use serde::{Deserialize, Serialize};

/// One `(address, units)` row of an allocation or allowlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub address: String,
    #[serde(with = "units_serde")]
    pub units: Units,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl AllocationEntry {
    pub fn new(address: impl Into<String>, units: Units) -> Self {
        Self {
            address: address.into(),
            units,
            label: None,
        }
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }
}

/// Ordered allocation rows.
pub type Allowlist = Vec<AllocationEntry>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_json_shape() {
        let entry = AllocationEntry::new("0xabc", 5).with_label(Some("Ana".into()));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "address": "0xabc", "units": "5", "label": "Ana" })
        );

        let unlabeled: AllocationEntry =
            serde_json::from_str(r#"{"address":"0xabc","units":7}"#).unwrap();
        assert_eq!(unlabeled.units, 7);
        assert_eq!(unlabeled.label, None);
    }
}
