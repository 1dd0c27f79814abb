//! Merkle commitment over an allowlist
//!
//! Every `(address, units)` pair becomes one leaf of a [`StandardMerkleTree`],
//! encoded as `abi.encode(address, uint256)` with the checksummed address.
//! The on-chain minter verifies claims against the resulting root, so the leaf
//! encoding here is fixed and must not change.

use crate::errors::{AllocationError, Result};
use impact_crypto::{
    encode_address_uint, hash_to_hex, hex_to_hash, process_proof, standard_leaf_hash, Hash32,
    StandardMerkleTree,
};
use impact_types::{units_serde, Address, AllocationEntry, Units};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use tracing::{debug, info};

/// Dump format identifier understood by standard tree tooling.
pub const TREE_FORMAT: &str = "standard-v1";

/// ABI types of one leaf, in encoding order.
pub const LEAF_ENCODING: [&str; 2] = ["address", "uint256"];

fn serialize_hash<S: Serializer>(hash: &Hash32, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&hash_to_hex(hash))
}

fn serialize_hashes<S: Serializer>(
    hashes: &[Hash32],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(hashes.iter().map(hash_to_hex))
}

/// One committed allowlist row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommittedLeaf {
    /// Checksummed address.
    pub address: String,
    #[serde(with = "units_serde")]
    pub units: Units,
    pub tree_index: usize,
    #[serde(serialize_with = "serialize_hash")]
    pub hash: Hash32,
}

/// Proof bundle for one recipient, hex encoded for external consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientProof {
    pub address: String,
    #[serde(with = "units_serde")]
    pub units: Units,
    #[serde(serialize_with = "serialize_hashes")]
    pub proof: Vec<Hash32>,
}

/// One value row of a [`MerkleTreeDump`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpValue {
    /// `[address, units]` as strings.
    pub value: (String, String),
    pub tree_index: usize,
}

/// Serialisable tree dump in the standard JSON layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleTreeDump {
    pub format: String,
    pub tree: Vec<String>,
    pub values: Vec<DumpValue>,
    pub leaf_encoding: Vec<String>,
}

/// A built commitment: the tree plus its leaves in allowlist order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowlistTree {
    tree: StandardMerkleTree,
    leaves: Vec<CommittedLeaf>,
}

impl AllowlistTree {
    pub fn root(&self) -> Hash32 {
        self.tree.root()
    }

    pub fn root_hex(&self) -> String {
        hash_to_hex(&self.tree.root())
    }

    /// Leaves in the order of the allowlist they were built from.
    pub fn leaves(&self) -> &[CommittedLeaf] {
        &self.leaves
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Value index of the leaf holding exactly `(address, units)`.
    pub fn position(&self, address: &Address, units: Units) -> Option<usize> {
        let checksummed = address.to_checksum();
        self.leaves
            .iter()
            .position(|leaf| leaf.address == checksummed && leaf.units == units)
    }

    /// Proofs for every recipient, in allowlist order.
    pub fn proofs(&self) -> Vec<RecipientProof> {
        self.leaves
            .iter()
            .enumerate()
            .filter_map(|(i, leaf)| {
                self.tree.proof(i).ok().map(|proof| RecipientProof {
                    address: leaf.address.clone(),
                    units: leaf.units,
                    proof,
                })
            })
            .collect()
    }

    pub fn dump(&self) -> MerkleTreeDump {
        MerkleTreeDump {
            format: TREE_FORMAT.to_string(),
            tree: self.tree.nodes().iter().map(hash_to_hex).collect(),
            values: self
                .leaves
                .iter()
                .map(|leaf| DumpValue {
                    value: (leaf.address.clone(), leaf.units.to_string()),
                    tree_index: leaf.tree_index,
                })
                .collect(),
            leaf_encoding: LEAF_ENCODING.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn parse_entry_address(entry: &AllocationEntry) -> Result<Address> {
    Address::parse(&entry.address).map_err(|source| AllocationError::InvalidAddress {
        address: entry.address.clone(),
        source,
    })
}

/// Leaf hash of an `(address, units)` pair.
pub fn leaf_hash(address: &Address, units: Units) -> Hash32 {
    standard_leaf_hash(&encode_address_uint(address.as_bytes(), units))
}

/// Commit to an allowlist.
///
/// Addresses are normalised to their checksummed form; malformed addresses
/// fail with `InvalidAddress`, and two entries that normalise to the same
/// address fail with `DuplicateAddress`.
pub fn build_tree(entries: &[AllocationEntry]) -> Result<AllowlistTree> {
    if entries.is_empty() {
        return Err(AllocationError::EmptyAllowlist);
    }

    let mut seen = HashSet::with_capacity(entries.len());
    let mut normalised = Vec::with_capacity(entries.len());
    for entry in entries {
        let address = parse_entry_address(entry)?;
        if !seen.insert(address) {
            return Err(AllocationError::DuplicateAddress {
                address: address.to_checksum(),
            });
        }
        normalised.push((address, entry.units));
    }

    let hashes: Vec<Hash32> = normalised
        .iter()
        .map(|(address, units)| leaf_hash(address, *units))
        .collect();
    let tree =
        StandardMerkleTree::from_leaf_hashes(&hashes).map_err(|_| AllocationError::EmptyAllowlist)?;

    let mut leaves = Vec::with_capacity(normalised.len());
    for (i, (address, units)) in normalised.into_iter().enumerate() {
        let tree_index = tree
            .tree_index(i)
            .map_err(|_| AllocationError::EmptyAllowlist)?;
        leaves.push(CommittedLeaf {
            address: address.to_checksum(),
            units,
            tree_index,
            hash: hashes[i],
        });
    }

    let built = AllowlistTree { tree, leaves };
    info!(root = %built.root_hex(), leaves = built.len(), "allowlist committed");
    Ok(built)
}

/// Sibling path proving `entry` is a leaf of `tree`.
pub fn generate_proof(tree: &AllowlistTree, entry: &AllocationEntry) -> Result<Vec<Hash32>> {
    let address = parse_entry_address(entry)?;
    let not_found = || AllocationError::EntryNotFound {
        address: entry.address.clone(),
        units: entry.units,
    };

    let index = tree.position(&address, entry.units).ok_or_else(not_found)?;
    let proof = tree.tree.proof(index).map_err(|_| not_found())?;
    debug!(address = %address, index, depth = proof.len(), "proof generated");
    Ok(proof)
}

/// Whether `proof` links `entry` to `root`.
///
/// Never fails: a malformed address, tampered units or a foreign proof all
/// simply yield `false`.
pub fn verify_proof(root: &Hash32, entry: &AllocationEntry, proof: &[Hash32]) -> bool {
    match Address::parse(&entry.address) {
        Ok(address) => process_proof(leaf_hash(&address, entry.units), proof) == *root,
        Err(_) => false,
    }
}

/// [`verify_proof`] over hex strings as supplied by untrusted callers.
pub fn verify_proof_hex(root: &str, entry: &AllocationEntry, proof: &[String]) -> bool {
    let Some(root) = hex_to_hash(root) else {
        return false;
    };
    let parsed: Option<Vec<Hash32>> = proof.iter().map(|h| hex_to_hash(h)).collect();
    match parsed {
        Some(proof) => verify_proof(&root, entry, &proof),
        None => false,
    }
}
