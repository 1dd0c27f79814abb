//! Contract ABI word encoding
//!
//! Static values occupy one 32-byte big-endian word; addresses and integers
//! are left-padded with zeros.

use crate::hash_functions::keccak256;

/// Width of one ABI word.
pub const WORD_BYTES: usize = 32;

/// First four bytes of `keccak256(signature)`, e.g. `transfer(address,uint256)`.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let digest = keccak256(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// A 20-byte address as a left-padded word.
pub fn address_word(address: &[u8; 20]) -> [u8; WORD_BYTES] {
    let mut word = [0u8; WORD_BYTES];
    word[12..].copy_from_slice(address);
    word
}

/// An unsigned integer as a big-endian word.
pub fn uint_word(value: u128) -> [u8; WORD_BYTES] {
    let mut word = [0u8; WORD_BYTES];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// `abi.encode(address, uint256)`: the preimage of an allowlist leaf.
pub fn encode_address_uint(address: &[u8; 20], value: u128) -> Vec<u8> {
    let mut out = Vec::with_capacity(WORD_BYTES * 2);
    out.extend_from_slice(&address_word(address));
    out.extend_from_slice(&uint_word(value));
    out
}
