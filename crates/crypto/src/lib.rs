//! Cryptographic primitives for impact certificate commitments
//!
//! Everything here must agree byte-for-byte with the on-chain verifier:
//! Keccak-256 hashing, 32-byte ABI words and the standard sorted-pair
//! Merkle tree with double-hashed leaves.

pub mod abi;
pub mod hash_functions;
pub mod merkle_trees;

pub use abi::{address_word, encode_address_uint, function_selector, uint_word, WORD_BYTES};
pub use hash_functions::{hash_to_hex, hex_to_hash, keccak256, Hash32};
pub use merkle_trees::{
    hash_pair, process_proof, standard_leaf_hash, verify_proof, MerkleError, StandardMerkleTree,
};
