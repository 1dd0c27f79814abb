//! Standard Merkle tree
//!
//! Layout and hashing follow the widely deployed "standard" tree that
//! on-chain proof verifiers expect:
//!
//! - leaf = `keccak256(keccak256(abi.encode(values...)))`
//! - leaves are sorted by hash before placement
//! - the tree is a flat array of `2n - 1` nodes; leaf `i` (in sorted order)
//!   sits at `len - 1 - i`, node `k` has children `2k + 1` and `2k + 2`
//! - internal node = `keccak256(min(a, b) ++ max(a, b))`
//! - a proof is the sibling path from the leaf up to (excluding) the root
//!
//! Because pairs are sorted before hashing, proofs carry no left/right flags.

use crate::hash_functions::{keccak256, Hash32};

/// Merkle tree error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MerkleError {
    #[error("cannot build a tree without leaves")]
    EmptyTree,
    #[error("value index {index} out of range for {len} leaves")]
    InvalidIndex { index: usize, len: usize },
}

/// Double-hash an ABI-encoded leaf preimage.
pub fn standard_leaf_hash(encoded: &[u8]) -> Hash32 {
    keccak256(&keccak256(encoded))
}

/// Commutative node hash: the smaller child goes first.
pub fn hash_pair(a: &Hash32, b: &Hash32) -> Hash32 {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(first);
    buf[32..].copy_from_slice(second);
    keccak256(&buf)
}

/// Fold a proof over a leaf hash, yielding the implied root.
pub fn process_proof(leaf: Hash32, proof: &[Hash32]) -> Hash32 {
    proof.iter().fold(leaf, |acc, sibling| hash_pair(&acc, sibling))
}

/// Whether `proof` links `leaf` to `root`.
pub fn verify_proof(root: &Hash32, leaf: Hash32, proof: &[Hash32]) -> bool {
    process_proof(leaf, proof) == *root
}

/// Flat-array standard Merkle tree over pre-hashed leaves.
///
/// Leaves are addressed by *value index*, i.e. their position in the input
/// slice, independent of the hash-sorted placement inside the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardMerkleTree {
    tree: Vec<Hash32>,
    tree_indices: Vec<usize>,
}

impl StandardMerkleTree {
    /// Build the tree from leaf hashes given in value order.
    pub fn from_leaf_hashes(leaves: &[Hash32]) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyTree);
        }

        let mut sorted: Vec<(Hash32, usize)> = leaves
            .iter()
            .enumerate()
            .map(|(value_index, hash)| (*hash, value_index))
            .collect();
        // stable: identical hashes keep input order
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        let n = sorted.len();
        let len = 2 * n - 1;
        let mut tree = vec![[0u8; 32]; len];
        let mut tree_indices = vec![0usize; n];

        for (i, (hash, value_index)) in sorted.into_iter().enumerate() {
            let tree_index = len - 1 - i;
            tree[tree_index] = hash;
            tree_indices[value_index] = tree_index;
        }

        for k in (0..len - n).rev() {
            tree[k] = hash_pair(&tree[2 * k + 1], &tree[2 * k + 2]);
        }

        Ok(Self { tree, tree_indices })
    }

    /// Get the Merkle root
    pub fn root(&self) -> Hash32 {
        self.tree[0]
    }

    /// Get the number of leaves
    pub fn leaf_count(&self) -> usize {
        self.tree_indices.len()
    }

    /// Position of a value's leaf inside the flat node array.
    pub fn tree_index(&self, value_index: usize) -> Result<usize, MerkleError> {
        self.tree_indices
            .get(value_index)
            .copied()
            .ok_or(MerkleError::InvalidIndex {
                index: value_index,
                len: self.leaf_count(),
            })
    }

    /// Leaf hash for a value.
    pub fn leaf_hash(&self, value_index: usize) -> Result<Hash32, MerkleError> {
        Ok(self.tree[self.tree_index(value_index)?])
    }

    /// Sibling path from a value's leaf to the root.
    pub fn proof(&self, value_index: usize) -> Result<Vec<Hash32>, MerkleError> {
        let mut index = self.tree_index(value_index)?;
        let mut path = Vec::new();

        while index > 0 {
            let sibling = if index % 2 == 1 { index + 1 } else { index - 1 };
            path.push(self.tree[sibling]);
            index = (index - 1) / 2;
        }

        Ok(path)
    }

    /// All nodes, root first.
    pub fn nodes(&self) -> &[Hash32] {
        &self.tree
    }
}
