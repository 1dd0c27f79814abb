//! Minter call encoding
//!
//! Builds the calldata of
//! `createAllowlist(address account, uint256 units, bytes32 merkleRoot, string uri, uint8 restrictions)`.
//! Nothing is signed or sent here.

use crate::errors::{MintError, Result};
use impact_crypto::{address_word, function_selector, uint_word, Hash32, WORD_BYTES};
use impact_types::{Address, Units};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Canonical signature of the minter entry point.
pub const CREATE_ALLOWLIST_SIGNATURE: &str = "createAllowlist(address,uint256,bytes32,string,uint8)";

/// Number of static head words: account, units, root, uri offset, restrictions.
const HEAD_WORDS: usize = 5;

/// On-chain transfer policy for minted fractions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum TransferRestrictions {
    #[default]
    AllowAll = 0,
    DisallowAll = 1,
    FromCreatorOnly = 2,
}

impl TransferRestrictions {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl FromStr for TransferRestrictions {
    type Err = MintError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "allow_all" | "allowall" | "0" => Ok(TransferRestrictions::AllowAll),
            "disallow_all" | "disallowall" | "1" => Ok(TransferRestrictions::DisallowAll),
            "from_creator_only" | "fromcreatoronly" | "2" => Ok(TransferRestrictions::FromCreatorOnly),
            _ => Err(MintError::UnknownRestriction(s.to_string())),
        }
    }
}

impl fmt::Display for TransferRestrictions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransferRestrictions::AllowAll => "allow_all",
            TransferRestrictions::DisallowAll => "disallow_all",
            TransferRestrictions::FromCreatorOnly => "from_creator_only",
        };
        f.write_str(name)
    }
}

/// Opaque call payload: selector plus ABI-encoded arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCall {
    pub selector: [u8; 4],
    pub data: Vec<u8>,
}

impl EncodedCall {
    /// Full calldata, selector first.
    pub fn calldata(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.data.len());
        out.extend_from_slice(&self.selector);
        out.extend_from_slice(&self.data);
        out
    }

    /// `0x`-prefixed hex of [`Self::calldata`].
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.calldata()))
    }
}

impl Serialize for EncodedCall {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD_BYTES) * WORD_BYTES
}

/// Encode a `createAllowlist` call.
///
/// The owner must be a well-formed account address and the metadata URI
/// must be non-empty.
pub fn encode_create_allowlist(
    owner: &str,
    total_units: Units,
    merkle_root: &Hash32,
    metadata_uri: &str,
    restrictions: TransferRestrictions,
) -> Result<EncodedCall> {
    let owner = Address::parse(owner).map_err(|source| MintError::InvalidOwner {
        address: owner.to_string(),
        source,
    })?;
    if total_units == 0 {
        return Err(MintError::ZeroUnits);
    }
    if metadata_uri.trim().is_empty() {
        return Err(MintError::EmptyMetadataUri);
    }

    let uri = metadata_uri.as_bytes();
    let mut data = Vec::with_capacity(WORD_BYTES * (HEAD_WORDS + 1) + padded_len(uri.len()));

    // head
    data.extend_from_slice(&address_word(owner.as_bytes()));
    data.extend_from_slice(&uint_word(total_units));
    data.extend_from_slice(merkle_root);
    data.extend_from_slice(&uint_word((HEAD_WORDS * WORD_BYTES) as u128));
    data.extend_from_slice(&uint_word(u128::from(restrictions.as_u8())));

    // tail: the uri string
    data.extend_from_slice(&uint_word(uri.len() as u128));
    data.extend_from_slice(uri);
    data.resize(data.len() + padded_len(uri.len()) - uri.len(), 0);

    debug!(
        owner = %owner,
        units = %total_units,
        restrictions = %restrictions,
        bytes = data.len() + 4,
        "createAllowlist call encoded"
    );

    Ok(EncodedCall {
        selector: function_selector(CREATE_ALLOWLIST_SIGNATURE),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use impact_crypto::hex_to_hash;

    const OWNER: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const ROOT: &str = "0x8426997f23b7102ff2b931dbba40c290cb16946300d43aa0783878989de13bcd";

    fn root() -> Hash32 {
        hex_to_hash(ROOT).unwrap()
    }

    #[test]
    fn selector_matches_minter() {
        assert_eq!(function_selector(CREATE_ALLOWLIST_SIGNATURE), [0xb3, 0x16, 0x96, 0x2f]);
    }

    #[test]
    fn known_calldata() {
        let call = encode_create_allowlist(
            OWNER,
            100_000_000,
            &root(),
            "ipfs://bafytest",
            TransferRestrictions::FromCreatorOnly,
        )
        .unwrap();

        let expected = concat!(
            "0xb316962f",
            "0000000000000000000000005aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
            "0000000000000000000000000000000000000000000000000000000005f5e100",
            "8426997f23b7102ff2b931dbba40c290cb16946300d43aa0783878989de13bcd",
            "00000000000000000000000000000000000000000000000000000000000000a0",
            "0000000000000000000000000000000000000000000000000000000000000002",
            "000000000000000000000000000000000000000000000000000000000000000f",
            "697066733a2f2f62616679746573740000000000000000000000000000000000",
        );
        assert_eq!(call.to_hex(), expected);
        assert_eq!(call.calldata().len(), 228);
    }

    #[test]
    fn word_aligned_uri_gets_no_padding() {
        let uri = "x".repeat(64);
        let call =
            encode_create_allowlist(OWNER, 1, &root(), &uri, TransferRestrictions::AllowAll).unwrap();
        assert_eq!(call.data.len(), 6 * 32 + 64);
        assert_eq!(call.data[4 * 32 + 31], 0);
    }

    #[test]
    fn lowercase_owner_accepted() {
        let lower = OWNER.to_ascii_lowercase();
        let a = encode_create_allowlist(&lower, 5, &root(), "ipfs://a", TransferRestrictions::AllowAll);
        let b = encode_create_allowlist(OWNER, 5, &root(), "ipfs://a", TransferRestrictions::AllowAll);
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(matches!(
            encode_create_allowlist("0x1234", 1, &root(), "ipfs://a", TransferRestrictions::AllowAll),
            Err(MintError::InvalidOwner { .. })
        ));
        assert_eq!(
            encode_create_allowlist(OWNER, 1, &root(), "  ", TransferRestrictions::AllowAll),
            Err(MintError::EmptyMetadataUri)
        );
        assert_eq!(
            encode_create_allowlist(OWNER, 0, &root(), "ipfs://a", TransferRestrictions::AllowAll),
            Err(MintError::ZeroUnits)
        );
    }

    #[test]
    fn restriction_names() {
        assert_eq!(TransferRestrictions::default(), TransferRestrictions::AllowAll);
        assert_eq!(
            "from-creator-only".parse::<TransferRestrictions>().unwrap(),
            TransferRestrictions::FromCreatorOnly
        );
        assert_eq!("DisallowAll".parse::<TransferRestrictions>().unwrap().as_u8(), 1);
        assert!("sometimes".parse::<TransferRestrictions>().is_err());
        assert_eq!(TransferRestrictions::FromCreatorOnly.to_string(), "from_creator_only");
    }
}
