//! End-to-end mint plan: records to calldata in one pass.

use anyhow::{Context, Result};
use impact_allocation::{
    build_contributor_stats, build_tree, distribute, DistributionMode, DistributionRequest,
    MerkleTreeDump, RecipientProof, ValidatedAllowlist,
};
use impact_metadata::{
    validate_document, CertificateDraft, CertificateMetadata, ComposeInput, MetadataComposer,
};
use impact_mint::{encode_create_allowlist, EncodedCall, TransferRestrictions};
use impact_types::{AllocationEntry, ContributionRecord, TOTAL_UNITS};
use serde::Serialize;
use tracing::info;

pub struct PlanInputs<'a> {
    pub draft: &'a CertificateDraft,
    pub records: &'a [ContributionRecord],
    pub mode: DistributionMode,
    /// Explicit allocation; wins over `draft.allowlist` and `mode`.
    pub custom: Option<&'a [AllocationEntry]>,
    pub owner: &'a str,
    pub metadata_uri: &'a str,
    pub restrictions: TransferRestrictions,
    pub generated_at: i64,
}

#[derive(Debug, Serialize)]
pub struct MintPlan {
    pub allocation: ValidatedAllowlist,
    pub merkle_root: String,
    pub proofs: Vec<RecipientProof>,
    pub tree: MerkleTreeDump,
    pub metadata: CertificateMetadata,
    pub metadata_fallback: bool,
    pub calldata: EncodedCall,
}

pub fn build_plan(inputs: PlanInputs<'_>) -> Result<MintPlan> {
    let stats = build_contributor_stats(inputs.records);

    let override_entries = inputs.custom.or(inputs.draft.allowlist.as_deref());
    let request = match override_entries {
        Some(entries) => DistributionRequest::Custom(entries),
        None => DistributionRequest::from_mode(inputs.mode, &stats, None)
            .context("cannot build distribution request")?,
    };

    let allocation = distribute(request).context("allocation failed")?;
    let allowlist = ValidatedAllowlist::new(allocation).context("allocation is not a valid allowlist")?;
    let tree = build_tree(&allowlist).context("failed to commit allowlist")?;

    let composed = MetadataComposer::new().compose(ComposeInput {
        draft: inputs.draft,
        records: inputs.records,
        allowlist: Some(allowlist.entries()),
        generated_at: inputs.generated_at,
    });
    let metadata_fallback = composed.is_fallback();
    let metadata = composed.into_document();
    validate_document(&metadata).context("composed metadata is invalid")?;

    let calldata = encode_create_allowlist(
        inputs.owner,
        TOTAL_UNITS,
        &tree.root(),
        inputs.metadata_uri,
        inputs.restrictions,
    )
    .context("failed to encode mint call")?;

    info!(
        root = %tree.root_hex(),
        recipients = allowlist.len(),
        "mint plan ready"
    );

    Ok(MintPlan {
        merkle_root: tree.root_hex(),
        proofs: tree.proofs(),
        tree: tree.dump(),
        allocation: allowlist,
        metadata,
        metadata_fallback,
        calldata,
    })
}
