//! Metadata composition
//!
//! Every field is resolved with the same precedence:
//! explicit draft value > value derived from the records > hard default.
//!
//! The base document (name, image, definitions) may come from an external
//! [`MetadataFormatter`]. When none is configured, or it fails, or it returns
//! nothing, the composer builds the base document locally and says so in the
//! returned [`FormattedDocument`].

use crate::document::{
    AttestationRef, CertificateDefinitions, CertificateMetadata, Definition, HiddenProperties,
    PROTOCOL_VERSION,
};
use crate::draft::{CertificateDraft, Timeframe};
use crate::errors::MetadataError;
use crate::image::fallback_image;
use chrono::{DateTime, Utc};
use impact_allocation::{
    aggregate_outcome_metrics, collect_work_scope, derive_work_timeframe, unique_contributors,
    OutcomeMetrics,
};
use impact_types::{normalize_address, AllocationEntry, ContributionRecord};
use serde::Serialize;
use tracing::{debug, warn};

/// Domain tag used when no record names one.
pub const DEFAULT_DOMAIN: &str = "unspecified";
/// Impact scope used when the draft names none.
pub const DEFAULT_IMPACT_SCOPE: &str = "all";
/// Rights granted when the draft names none.
pub const DEFAULT_RIGHTS: &str = "Public Display";
/// End marker of an open-ended impact timeframe.
pub const INDEFINITE_END: i64 = 0;

/// Fully resolved certificate fields, handed to formatters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateFields {
    pub name: String,
    pub description: String,
    pub image: String,
    pub external_url: Option<String>,
    pub work_scope: Vec<String>,
    pub impact_scope: Vec<String>,
    pub work_timeframe: Timeframe,
    pub impact_timeframe: Timeframe,
    pub contributors: Vec<String>,
    pub rights: Vec<String>,
}

/// External document formatter, e.g. an SDK that validates against the
/// published schema.
pub trait MetadataFormatter {
    /// Build the base document, or `Ok(None)` when the formatter produced nothing.
    fn format(&self, fields: &CertificateFields) -> Result<Option<CertificateMetadata>, MetadataError>;
}

/// Why the local builder produced the base document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    NoFormatter,
    FormatterFailed(String),
    FormatterReturnedNothing,
}

/// Composed document, tagged with the path that built its base.
#[derive(Debug, Clone, PartialEq)]
pub enum FormattedDocument {
    External(CertificateMetadata),
    Fallback {
        document: CertificateMetadata,
        reason: FallbackReason,
    },
}

impl FormattedDocument {
    pub fn document(&self) -> &CertificateMetadata {
        match self {
            FormattedDocument::External(document) => document,
            FormattedDocument::Fallback { document, .. } => document,
        }
    }

    pub fn into_document(self) -> CertificateMetadata {
        match self {
            FormattedDocument::External(document) => document,
            FormattedDocument::Fallback { document, .. } => document,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, FormattedDocument::Fallback { .. })
    }

    fn document_mut(&mut self) -> &mut CertificateMetadata {
        match self {
            FormattedDocument::External(document) => document,
            FormattedDocument::Fallback { document, .. } => document,
        }
    }
}

/// Inputs of one composition.
#[derive(Debug, Clone, Copy)]
pub struct ComposeInput<'a> {
    pub draft: &'a CertificateDraft,
    pub records: &'a [ContributionRecord],
    /// Allocation override; takes precedence over `draft.allowlist`.
    pub allowlist: Option<&'a [AllocationEntry]>,
    /// Unix seconds, used as the default work timeframe.
    pub generated_at: i64,
}

/// Builds [`CertificateMetadata`] from a draft and its backing records.
#[derive(Default)]
pub struct MetadataComposer<'f> {
    formatter: Option<&'f dyn MetadataFormatter>,
}

impl<'f> MetadataComposer<'f> {
    pub fn new() -> Self {
        Self { formatter: None }
    }

    pub fn with_formatter(formatter: &'f dyn MetadataFormatter) -> Self {
        Self {
            formatter: Some(formatter),
        }
    }

    pub fn compose(&self, input: ComposeInput<'_>) -> FormattedDocument {
        let fields = resolve_fields(&input);

        let mut formatted = match self.formatter {
            None => FormattedDocument::Fallback {
                document: build_local_document(&fields),
                reason: FallbackReason::NoFormatter,
            },
            Some(formatter) => match formatter.format(&fields) {
                Ok(Some(document)) => FormattedDocument::External(document),
                Ok(None) => {
                    warn!("metadata formatter returned nothing, using local builder");
                    FormattedDocument::Fallback {
                        document: build_local_document(&fields),
                        reason: FallbackReason::FormatterReturnedNothing,
                    }
                }
                Err(err) => {
                    warn!(error = %err, "metadata formatter failed, using local builder");
                    FormattedDocument::Fallback {
                        document: build_local_document(&fields),
                        reason: FallbackReason::FormatterFailed(err.to_string()),
                    }
                }
            },
        };

        formatted.document_mut().hidden_properties = Some(hidden_properties(&input));
        debug!(
            name = %fields.name,
            contributors = fields.contributors.len(),
            fallback = formatted.is_fallback(),
            "certificate metadata composed"
        );
        formatted
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    let kept: Vec<String> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    (!kept.is_empty()).then_some(kept)
}

/// Apply the precedence rules to every definition field.
pub fn resolve_fields(input: &ComposeInput<'_>) -> CertificateFields {
    let draft = input.draft;

    let work_scope = non_empty(&draft.work_scope)
        .or_else(|| non_empty(&collect_work_scope(input.records)))
        .unwrap_or_else(|| vec![draft.title.trim().to_string()]);

    let impact_scope =
        non_empty(&draft.impact_scope).unwrap_or_else(|| vec![DEFAULT_IMPACT_SCOPE.to_string()]);

    let work_timeframe = draft
        .work_timeframe
        .or_else(|| {
            let derived = derive_work_timeframe(input.records);
            derived.start.zip(derived.end).map(|(s, e)| Timeframe::new(s, e))
        })
        .unwrap_or_else(|| Timeframe::new(input.generated_at, input.generated_at));

    let impact_timeframe = draft
        .impact_timeframe
        .unwrap_or_else(|| Timeframe::new(work_timeframe.start, INDEFINITE_END));

    let allowlist = input.allowlist.or(draft.allowlist.as_deref());
    let contributors = match allowlist {
        // checksummed, matching the committed leaves
        Some(entries) if !entries.is_empty() => entries
            .iter()
            .map(|e| normalize_address(&e.address).unwrap_or_else(|_| e.address.clone()))
            .collect(),
        _ => unique_contributors(input.records),
    };

    let rights = non_empty(&draft.rights).unwrap_or_else(|| vec![DEFAULT_RIGHTS.to_string()]);

    let image = draft
        .image_uri
        .as_deref()
        .map(str::trim)
        .filter(|uri| !uri.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback_image(&draft.title, draft.collection_name.as_deref()));

    CertificateFields {
        name: draft.title.clone(),
        description: draft.description.clone(),
        image,
        external_url: draft.external_url.clone(),
        work_scope,
        impact_scope,
        work_timeframe,
        impact_timeframe,
        contributors,
        rights,
    }
}

fn format_date(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| secs.to_string())
}

fn display_timeframe(tf: &Timeframe) -> String {
    let end = if tf.is_indefinite() {
        "Indefinite".to_string()
    } else {
        format_date(tf.end)
    };
    format!("{} → {}", format_date(tf.start), end)
}

/// Base document built without any external formatter.
pub fn build_local_document(fields: &CertificateFields) -> CertificateMetadata {
    CertificateMetadata {
        name: fields.name.clone(),
        description: fields.description.clone(),
        image: fields.image.clone(),
        external_url: fields.external_url.clone(),
        hypercert: CertificateDefinitions {
            work_scope: Definition::new(
                "Work Scope",
                fields.work_scope.clone(),
                fields.work_scope.join(" ∧ "),
            ),
            impact_scope: Definition::new(
                "Impact Scope",
                fields.impact_scope.clone(),
                fields.impact_scope.join(" ∧ "),
            ),
            work_timeframe: Definition::new(
                "Work Timeframe",
                [fields.work_timeframe.start, fields.work_timeframe.end],
                display_timeframe(&fields.work_timeframe),
            ),
            impact_timeframe: Definition::new(
                "Impact Timeframe",
                [fields.impact_timeframe.start, fields.impact_timeframe.end],
                display_timeframe(&fields.impact_timeframe),
            ),
            contributors: Definition::new(
                "Contributors",
                fields.contributors.clone(),
                fields.contributors.join(", "),
            ),
            rights: Definition::new("Rights", fields.rights.clone(), fields.rights.join(", ")),
        },
        hidden_properties: None,
    }
}

fn resolve_outcomes(draft: &CertificateDraft, records: &[ContributionRecord]) -> OutcomeMetrics {
    match &draft.outcomes {
        Some(outcomes) if !outcomes.predefined.is_empty() => outcomes.clone(),
        Some(outcomes) => OutcomeMetrics {
            custom: outcomes.custom.clone(),
            ..aggregate_outcome_metrics(records)
        },
        None => aggregate_outcome_metrics(records),
    }
}

fn hidden_properties(input: &ComposeInput<'_>) -> HiddenProperties {
    let draft = input.draft;
    let records = input.records;

    let domain = records
        .iter()
        .filter_map(|r| r.domain.as_deref())
        .map(str::trim)
        .find(|d| !d.is_empty())
        .unwrap_or(DEFAULT_DOMAIN)
        .to_string();

    HiddenProperties {
        garden_id: draft
            .garden_id
            .clone()
            .or_else(|| records.first().map(|r| r.garden_id.clone())),
        attestations: records
            .iter()
            .map(|r| AttestationRef {
                id: r.id.clone(),
                title: r.title.clone(),
                domain: r.domain.clone(),
            })
            .collect(),
        sdg_goals: draft.sdg_goals.clone(),
        capitals: draft.capitals.clone(),
        outcomes: resolve_outcomes(draft, records),
        domain,
        protocol_version: PROTOCOL_VERSION.to_string(),
    }
}
