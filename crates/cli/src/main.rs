//! Impact certificate command line interface
//!
//! Reads JSON inputs, runs the allocation / commitment / metadata / encoding
//! steps and prints JSON results to stdout. Logs go to stderr.

mod pipeline;
mod settings;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use impact_allocation::{
    build_contributor_stats, build_tree, distribute, generate_proof, validate_allowlist,
    verify_proof_hex, DistributionMode, DistributionRequest,
};
use impact_crypto::{hash_to_hex, hex_to_hash};
use impact_metadata::{validate_document, CertificateDraft, ComposeInput, MetadataComposer};
use impact_mint::{decode_revert_hex, encode_create_allowlist, ErrorRegistry, TransferRestrictions};
use impact_types::{AllocationEntry, ContributionRecord, ContributorWeight, Units, TOTAL_UNITS};
use pipeline::{build_plan, PlanInputs};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use settings::{CliConfig, LogFormat};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "impact-cli")]
#[command(about = "Impact certificate allocation, commitment and minting tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./impact.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level, overrides the configured one
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Distribute units among contributors
    Allocate(AllocateCommand),
    /// Validate an allowlist and commit to it
    Commit {
        /// Allowlist JSON file
        #[arg(long)]
        allowlist: PathBuf,
    },
    /// Produce the proof for one allowlist entry
    Prove {
        /// Allowlist JSON file
        #[arg(long)]
        allowlist: PathBuf,
        #[arg(long)]
        address: String,
        #[arg(long)]
        units: Units,
    },
    /// Check a proof against a root
    Verify {
        /// Merkle root (0x-prefixed hex)
        #[arg(long)]
        root: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        units: Units,
        /// Sibling hashes, comma separated
        #[arg(long, value_delimiter = ',')]
        proof: Vec<String>,
    },
    /// Compose the certificate metadata document
    Compose(ComposeCommand),
    /// Encode the createAllowlist call
    Encode(EncodeCommand),
    /// Decode minter revert data
    DecodeRevert {
        /// Revert data (0x-prefixed hex)
        data: String,
    },
    /// Run the whole chain from records to calldata
    Plan(PlanCommand),
}

#[derive(Args)]
struct AllocateCommand {
    /// Contribution records JSON file
    #[arg(long, conflicts_with = "contributors")]
    records: Option<PathBuf>,
    /// Contributor weights JSON file
    #[arg(long)]
    contributors: Option<PathBuf>,
    /// equal | by_count | by_value | custom
    #[arg(long)]
    mode: Option<String>,
    /// Allocation entries for custom mode
    #[arg(long)]
    custom: Option<PathBuf>,
}

#[derive(Args)]
struct ComposeCommand {
    /// Certificate draft JSON file
    #[arg(long)]
    draft: PathBuf,
    /// Contribution records JSON file
    #[arg(long)]
    records: Option<PathBuf>,
    /// Allowlist JSON file
    #[arg(long)]
    allowlist: Option<PathBuf>,
}

#[derive(Args)]
struct EncodeCommand {
    /// Certificate owner address
    #[arg(long)]
    owner: String,
    /// Merkle root (0x-prefixed hex)
    #[arg(long)]
    root: String,
    /// Metadata URI returned by the uploader
    #[arg(long)]
    uri: String,
    #[arg(long, default_value_t = TOTAL_UNITS)]
    units: Units,
    /// allow_all | disallow_all | from_creator_only
    #[arg(long)]
    restriction: Option<String>,
}

#[derive(Args)]
struct PlanCommand {
    /// Certificate draft JSON file
    #[arg(long)]
    draft: PathBuf,
    /// Contribution records JSON file
    #[arg(long)]
    records: PathBuf,
    /// Explicit allocation entries, replacing the computed distribution
    #[arg(long)]
    custom: Option<PathBuf>,
    #[arg(long)]
    mode: Option<String>,
    #[arg(long)]
    owner: String,
    /// Metadata URI returned by the uploader
    #[arg(long)]
    uri: String,
    #[arg(long)]
    restriction: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level;
    }
    init_logging(&config);

    match cli.command {
        Commands::Allocate(cmd) => handle_allocate(cmd, &config),
        Commands::Commit { allowlist } => handle_commit(&allowlist),
        Commands::Prove {
            allowlist,
            address,
            units,
        } => handle_prove(&allowlist, address, units),
        Commands::Verify {
            root,
            address,
            units,
            proof,
        } => {
            let entry = AllocationEntry::new(address, units);
            let valid = verify_proof_hex(&root, &entry, &proof);
            print_json(&json!({ "valid": valid }))
        }
        Commands::Compose(cmd) => handle_compose(cmd, &config),
        Commands::Encode(cmd) => handle_encode(cmd, &config),
        Commands::DecodeRevert { data } => {
            let reason = decode_revert_hex(&ErrorRegistry::with_minter_errors(), &data)?;
            print_json(&reason)
        }
        Commands::Plan(cmd) => handle_plan(cmd, &config),
    }
}

fn init_logging(config: &CliConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match config.log_format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init(),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_mode(flag: Option<&str>, config: &CliConfig) -> Result<DistributionMode> {
    let raw = flag.unwrap_or(&config.distribution_mode);
    raw.parse()
        .with_context(|| format!("invalid distribution mode {raw:?}"))
}

fn parse_restriction(flag: Option<&str>, config: &CliConfig) -> Result<TransferRestrictions> {
    let raw = flag.unwrap_or(&config.transfer_restriction);
    raw.parse()
        .with_context(|| format!("invalid transfer restriction {raw:?}"))
}

fn handle_allocate(cmd: AllocateCommand, config: &CliConfig) -> Result<()> {
    let mode = parse_mode(cmd.mode.as_deref(), config)?;

    let contributors: Vec<ContributorWeight> = match (&cmd.records, &cmd.contributors) {
        (Some(path), _) => build_contributor_stats(&read_json::<Vec<ContributionRecord>>(path)?),
        (None, Some(path)) => read_json(path)?,
        (None, None) if mode == DistributionMode::Custom => Vec::new(),
        (None, None) => anyhow::bail!("either --records or --contributors is required"),
    };
    let custom: Option<Vec<AllocationEntry>> = cmd.custom.as_deref().map(read_json).transpose()?;
    debug!(contributors = contributors.len(), ?mode, "allocating");

    let request = DistributionRequest::from_mode(mode, &contributors, custom.as_deref())?;
    let allocation = distribute(request)?;
    print_json(&allocation)
}

fn handle_commit(path: &Path) -> Result<()> {
    let entries: Vec<AllocationEntry> = read_json(path)?;
    validate_allowlist(&entries).context("allowlist rejected")?;
    let tree = build_tree(&entries)?;

    print_json(&json!({
        "root": tree.root_hex(),
        "leaves": tree.leaves(),
        "proofs": tree.proofs(),
        "tree": tree.dump(),
    }))
}

fn handle_prove(path: &Path, address: String, units: Units) -> Result<()> {
    let entries: Vec<AllocationEntry> = read_json(path)?;
    let tree = build_tree(&entries)?;
    let entry = AllocationEntry::new(address, units);
    let proof = generate_proof(&tree, &entry)?;

    print_json(&json!({
        "root": tree.root_hex(),
        "address": entry.address,
        "units": units.to_string(),
        "proof": proof.iter().map(hash_to_hex).collect::<Vec<_>>(),
    }))
}

fn handle_compose(cmd: ComposeCommand, config: &CliConfig) -> Result<()> {
    let draft: CertificateDraft = read_json(&cmd.draft)?;
    let records: Vec<ContributionRecord> = match &cmd.records {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };
    let allowlist: Option<Vec<AllocationEntry>> =
        cmd.allowlist.as_deref().map(read_json).transpose()?;

    let composed = MetadataComposer::new().compose(ComposeInput {
        draft: &draft,
        records: &records,
        allowlist: allowlist.as_deref(),
        generated_at: config.generated_at(),
    });
    validate_document(composed.document()).context("composed metadata is invalid")?;
    print_json(composed.document())
}

fn handle_encode(cmd: EncodeCommand, config: &CliConfig) -> Result<()> {
    let root = hex_to_hash(&cmd.root)
        .with_context(|| format!("merkle root {:?} is not 32 bytes of hex", cmd.root))?;
    let restrictions = parse_restriction(cmd.restriction.as_deref(), config)?;
    let call = encode_create_allowlist(&cmd.owner, cmd.units, &root, &cmd.uri, restrictions)?;
    print_json(&json!({ "calldata": call }))
}

fn handle_plan(cmd: PlanCommand, config: &CliConfig) -> Result<()> {
    let draft: CertificateDraft = read_json(&cmd.draft)?;
    let records: Vec<ContributionRecord> = read_json(&cmd.records)?;
    let custom: Option<Vec<AllocationEntry>> = cmd.custom.as_deref().map(read_json).transpose()?;

    let plan = build_plan(PlanInputs {
        draft: &draft,
        records: &records,
        mode: parse_mode(cmd.mode.as_deref(), config)?,
        custom: custom.as_deref(),
        owner: &cmd.owner,
        metadata_uri: &cmd.uri,
        restrictions: parse_restriction(cmd.restriction.as_deref(), config)?,
        generated_at: config.generated_at(),
    })?;
    print_json(&plan)
}
