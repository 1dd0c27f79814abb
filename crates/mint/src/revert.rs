//! Revert reason decoding
//!
//! A failed minter call returns ABI-encoded revert data. Standard
//! `Error(string)` and `Panic(uint256)` payloads are decoded directly; custom
//! errors are looked up in an [`ErrorRegistry`] that is assembled once and
//! passed in explicitly.

use crate::errors::Result;
use impact_crypto::{function_selector, WORD_BYTES};
use serde::Serialize;
use std::collections::BTreeMap;

const ERROR_STRING_SIGNATURE: &str = "Error(string)";
const PANIC_SIGNATURE: &str = "Panic(uint256)";

/// Custom errors raised by the certificate minter.
pub const MINTER_ERRORS: [&str; 9] = [
    "AlreadyClaimed()",
    "ArraySize()",
    "DoesNotExist()",
    "DuplicateEntry()",
    "Invalid()",
    "NotAllowed()",
    "NotApprovedOrOwner()",
    "TransfersNotAllowed()",
    "TypeMismatch()",
];

/// Immutable selector -> error signature table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorRegistry {
    signatures: BTreeMap<[u8; 4], String>,
}

/// Collects error signatures before freezing them into an [`ErrorRegistry`].
#[derive(Debug, Clone, Default)]
pub struct ErrorRegistryBuilder {
    signatures: BTreeMap<[u8; 4], String>,
}

impl ErrorRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one signature such as `NotAllowed()`. Later registrations
    /// of the same selector replace earlier ones.
    pub fn register(mut self, signature: &str) -> Self {
        let signature = signature.trim();
        self.signatures
            .insert(function_selector(signature), signature.to_string());
        self
    }

    pub fn register_all<'a>(self, signatures: impl IntoIterator<Item = &'a str>) -> Self {
        signatures.into_iter().fold(self, |builder, sig| builder.register(sig))
    }

    pub fn build(self) -> ErrorRegistry {
        ErrorRegistry {
            signatures: self.signatures,
        }
    }
}

impl ErrorRegistry {
    pub fn builder() -> ErrorRegistryBuilder {
        ErrorRegistryBuilder::new()
    }

    /// Registry seeded with [`MINTER_ERRORS`].
    pub fn with_minter_errors() -> Self {
        Self::builder().register_all(MINTER_ERRORS).build()
    }

    pub fn lookup(&self, selector: &[u8; 4]) -> Option<&str> {
        self.signatures.get(selector).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

/// Decoded revert reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RevertReason {
    /// `Error(string)` / `require(cond, "message")`.
    Message { message: String },
    /// `Panic(uint256)` raised by the compiler's runtime checks.
    Panic { code: u64, description: String },
    /// A registered custom error.
    Custom { selector: String, signature: String },
    /// Empty, malformed or unregistered data, hex encoded.
    Unknown { data: String },
}

/// Human-readable meaning of a panic code.
pub fn panic_description(code: u64) -> &'static str {
    match code {
        0x00 => "generic compiler panic",
        0x01 => "assertion failed",
        0x11 => "arithmetic overflow or underflow",
        0x12 => "division or modulo by zero",
        0x21 => "invalid enum conversion",
        0x22 => "invalid storage byte array encoding",
        0x31 => "pop on empty array",
        0x32 => "array index out of bounds",
        0x41 => "out of memory",
        0x51 => "call to zero-initialized function",
        _ => "unknown panic code",
    }
}

fn word(data: &[u8], offset: usize) -> Option<&[u8]> {
    data.get(offset..offset.checked_add(WORD_BYTES)?)
}

/// Read a word as `usize`, rejecting anything that does not fit.
fn word_as_usize(data: &[u8], offset: usize) -> Option<usize> {
    let w = word(data, offset)?;
    let (high, low) = w.split_at(WORD_BYTES - 8);
    if high.iter().any(|b| *b != 0) {
        return None;
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(low);
    usize::try_from(u64::from_be_bytes(buf)).ok()
}

fn decode_error_string(args: &[u8]) -> Option<String> {
    let offset = word_as_usize(args, 0)?;
    let len = word_as_usize(args, offset)?;
    let start = offset.checked_add(WORD_BYTES)?;
    let bytes = args.get(start..start.checked_add(len)?)?;
    String::from_utf8(bytes.to_vec()).ok()
}

fn decode_panic_code(args: &[u8]) -> Option<u64> {
    word_as_usize(args, 0).map(|code| code as u64)
}

/// Decode raw revert data. Never fails; anything unrecognised is `Unknown`.
pub fn decode_revert(registry: &ErrorRegistry, data: &[u8]) -> RevertReason {
    let unknown = || RevertReason::Unknown {
        data: format!("0x{}", hex::encode(data)),
    };

    if data.len() < 4 {
        return unknown();
    }
    let (head, args) = data.split_at(4);
    let selector = [head[0], head[1], head[2], head[3]];

    if selector == function_selector(ERROR_STRING_SIGNATURE) {
        return decode_error_string(args)
            .map(|message| RevertReason::Message { message })
            .unwrap_or_else(unknown);
    }

    if selector == function_selector(PANIC_SIGNATURE) {
        return decode_panic_code(args)
            .map(|code| RevertReason::Panic {
                code,
                description: panic_description(code).to_string(),
            })
            .unwrap_or_else(unknown);
    }

    match registry.lookup(&selector) {
        Some(signature) => RevertReason::Custom {
            selector: format!("0x{}", hex::encode(selector)),
            signature: signature.to_string(),
        },
        None => unknown(),
    }
}

/// [`decode_revert`] over `0x`-prefixed (or bare) hex.
pub fn decode_revert_hex(registry: &ErrorRegistry, data: &str) -> Result<RevertReason> {
    let payload = data.trim();
    let payload = payload.strip_prefix("0x").unwrap_or(payload);
    let bytes = hex::decode(payload)?;
    Ok(decode_revert(registry, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MintError;
    use impact_crypto::uint_word;

    fn error_string_payload(message: &str) -> Vec<u8> {
        let mut data = function_selector(ERROR_STRING_SIGNATURE).to_vec();
        data.extend_from_slice(&uint_word(32));
        data.extend_from_slice(&uint_word(message.len() as u128));
        data.extend_from_slice(message.as_bytes());
        data.resize(data.len() + (32 - message.len() % 32) % 32, 0);
        data
    }

    #[test]
    fn minter_registry_selectors() {
        let registry = ErrorRegistry::with_minter_errors();
        assert_eq!(registry.len(), MINTER_ERRORS.len());
        assert_eq!(registry.lookup(&[0x64, 0x6c, 0xf5, 0x58]), Some("AlreadyClaimed()"));
        assert_eq!(registry.lookup(&[0xab, 0x06, 0x4a, 0xd3]), Some("TransfersNotAllowed()"));
        assert_eq!(registry.lookup(&[0, 0, 0, 0]), None);
    }

    #[test]
    fn decodes_error_string() {
        let registry = ErrorRegistry::default();
        let reason = decode_revert(&registry, &error_string_payload("Invalid: not allowlisted"));
        assert_eq!(
            reason,
            RevertReason::Message {
                message: "Invalid: not allowlisted".into()
            }
        );
    }

    #[test]
    fn truncated_error_string_is_unknown() {
        let mut data = error_string_payload("a long enough message to span a word");
        data.truncate(4 + 64 + 5);
        assert!(matches!(
            decode_revert(&ErrorRegistry::default(), &data),
            RevertReason::Unknown { .. }
        ));
    }

    #[test]
    fn decodes_panic() {
        let mut data = function_selector(PANIC_SIGNATURE).to_vec();
        data.extend_from_slice(&uint_word(0x11));
        assert_eq!(
            decode_revert(&ErrorRegistry::default(), &data),
            RevertReason::Panic {
                code: 0x11,
                description: "arithmetic overflow or underflow".into()
            }
        );
    }

    #[test]
    fn decodes_registered_custom_error() {
        let registry = ErrorRegistry::with_minter_errors();
        let data = function_selector("NotAllowed()");
        assert_eq!(
            decode_revert(&registry, &data),
            RevertReason::Custom {
                selector: "0x3d693ada".into(),
                signature: "NotAllowed()".into()
            }
        );
        // the same bytes mean nothing to an empty registry
        assert_eq!(
            decode_revert(&ErrorRegistry::default(), &data),
            RevertReason::Unknown { data: "0x3d693ada".into() }
        );
    }

    #[test]
    fn registries_are_independent() {
        let extended = ErrorRegistry::builder()
            .register_all(MINTER_ERRORS)
            .register("InsufficientBalance(uint256)")
            .build();
        assert_eq!(extended.len(), MINTER_ERRORS.len() + 1);
        assert_eq!(ErrorRegistry::with_minter_errors().len(), MINTER_ERRORS.len());
    }

    #[test]
    fn short_or_empty_data_is_unknown() {
        let registry = ErrorRegistry::with_minter_errors();
        assert_eq!(
            decode_revert(&registry, &[]),
            RevertReason::Unknown { data: "0x".into() }
        );
        assert_eq!(
            decode_revert(&registry, &[0x08, 0xc3]),
            RevertReason::Unknown { data: "0x08c3".into() }
        );
    }

    #[test]
    fn hex_entry_point() {
        let registry = ErrorRegistry::with_minter_errors();
        assert_eq!(
            decode_revert_hex(&registry, "0x646cf558").unwrap(),
            RevertReason::Custom {
                selector: "0x646cf558".into(),
                signature: "AlreadyClaimed()".into()
            }
        );
        assert!(matches!(
            decode_revert_hex(&registry, "0xnothex"),
            Err(MintError::InvalidRevertData(_))
        ));
    }
}
