//! Draft certificate input as authored in the editing UI

use impact_allocation::OutcomeMetrics;
use impact_types::AllocationEntry;
use serde::{Deserialize, Serialize};

/// Closed interval in unix seconds. An `end` of `0` marks an open-ended
/// (indefinite) impact period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeframe {
    pub start: i64,
    pub end: i64,
}

impl Timeframe {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn is_indefinite(&self) -> bool {
        self.end == 0
    }
}

/// Everything the author may set explicitly. Empty or missing fields are
/// resolved from the records or from defaults when composing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificateDraft {
    pub title: String,
    pub description: String,
    pub image_uri: Option<String>,
    pub external_url: Option<String>,
    /// Display name of the garden or collection, used on the fallback image.
    pub collection_name: Option<String>,
    pub garden_id: Option<String>,
    pub work_scope: Vec<String>,
    pub impact_scope: Vec<String>,
    pub work_timeframe: Option<Timeframe>,
    pub impact_timeframe: Option<Timeframe>,
    pub sdg_goals: Vec<u8>,
    pub capitals: Vec<String>,
    pub outcomes: Option<OutcomeMetrics>,
    pub allowlist: Option<Vec<AllocationEntry>>,
    pub rights: Vec<String>,
}

impl CertificateDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }
}
