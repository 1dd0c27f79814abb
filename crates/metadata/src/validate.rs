use crate::document::CertificateMetadata;
use crate::errors::{MetadataError, Result};

/// Structural checks run before a document is handed to the uploader.
pub fn validate_document(doc: &CertificateMetadata) -> Result<()> {
    if doc.name.trim().is_empty() {
        return Err(MetadataError::EmptyName);
    }
    if doc.description.trim().is_empty() {
        return Err(MetadataError::EmptyDescription);
    }

    let [start, end] = doc.hypercert.work_timeframe.value;
    if start > end {
        return Err(MetadataError::InvertedTimeframe {
            field: "work_timeframe",
            start,
            end,
        });
    }

    // end == 0 is the indefinite marker
    let [start, end] = doc.hypercert.impact_timeframe.value;
    if end != 0 && start > end {
        return Err(MetadataError::InvertedTimeframe {
            field: "impact_timeframe",
            start,
            end,
        });
    }

    if doc.hypercert.contributors.value.is_empty() {
        return Err(MetadataError::NoContributors);
    }
    Ok(())
}
