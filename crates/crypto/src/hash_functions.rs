//! Keccak-256 and 32-byte hash helpers

use sha3::{Digest, Keccak256};

/// A 32-byte digest.
pub type Hash32 = [u8; 32];

/// Keccak-256 (the pre-standard SHA-3 padding used by the EVM).
pub fn keccak256(data: &[u8]) -> Hash32 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// `0x`-prefixed lowercase hex.
pub fn hash_to_hex(hash: &Hash32) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Parse a `0x`-prefixed (or bare) 64-char hex string into a digest.
pub fn hex_to_hash(value: &str) -> Option<Hash32> {
    let payload = value.strip_prefix("0x").unwrap_or(value);
    let mut out = [0u8; 32];
    hex::decode_to_slice(payload, &mut out).ok()?;
    Some(out)
}
