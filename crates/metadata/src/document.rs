//! Published certificate document
//!
//! Field names and nesting follow the externally consumed certificate
//! schema, so explorers and marketplaces can parse the document unchanged.

use impact_allocation::OutcomeMetrics;
use serde::{Deserialize, Serialize};

/// Version stamp written into every vendor block.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Named value plus a human-readable rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition<T> {
    pub name: String,
    pub value: T,
    pub display_value: String,
}

impl<T> Definition<T> {
    pub fn new(name: impl Into<String>, value: T, display_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            display_value: display_value.into(),
        }
    }
}

/// Scope, timeframe, contributor and rights definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateDefinitions {
    pub work_scope: Definition<Vec<String>>,
    pub impact_scope: Definition<Vec<String>>,
    /// `[start, end]` in unix seconds.
    pub work_timeframe: Definition<[i64; 2]>,
    /// `[start, end]` in unix seconds, `end == 0` meaning indefinite.
    pub impact_timeframe: Definition<[i64; 2]>,
    pub contributors: Definition<Vec<String>>,
    pub rights: Definition<Vec<String>>,
}

/// Reference to one contribution record backing the certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationRef {
    pub id: String,
    pub title: String,
    pub domain: Option<String>,
}

/// Vendor extension block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiddenProperties {
    pub garden_id: Option<String>,
    pub attestations: Vec<AttestationRef>,
    pub sdg_goals: Vec<u8>,
    pub capitals: Vec<String>,
    pub outcomes: OutcomeMetrics,
    pub domain: String,
    pub protocol_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    pub hypercert: CertificateDefinitions,
    /// Absent only on base documents that have not been composed yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_properties: Option<HiddenProperties>,
}
