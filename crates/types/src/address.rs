use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when parsing an account address string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AddressError {
    #[error("address must start with '0x'")]
    InvalidPrefix,
    #[error("address must be {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("address payload is not valid hexadecimal")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("mixed-case address does not match its checksum (expected {expected})")]
    InvalidChecksum { expected: String },
}

/// Number of raw bytes contained in an account address.
pub const ADDRESS_BYTES: usize = 20;
/// Expected string length of an encoded address (`0x` + 40 hex chars).
pub const ADDRESS_STRING_LENGTH: usize = 2 + ADDRESS_BYTES * 2;

/// A 20-byte account identifier.
///
/// Parsing accepts all-lowercase and all-uppercase hex as well as mixed-case
/// input carrying a valid checksum. Display always yields the checksummed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; ADDRESS_BYTES]);

impl Address {
    /// Parse an address string, enforcing the checksum on mixed-case input.
    pub fn parse(address: &str) -> Result<Self, AddressError> {
        let payload = address
            .strip_prefix("0x")
            .or_else(|| address.strip_prefix("0X"))
            .ok_or(AddressError::InvalidPrefix)?;

        if address.len() != ADDRESS_STRING_LENGTH {
            return Err(AddressError::InvalidLength {
                expected: ADDRESS_STRING_LENGTH,
                actual: address.len(),
            });
        }

        let mut bytes = [0u8; ADDRESS_BYTES];
        hex::decode_to_slice(payload, &mut bytes)?;
        let parsed = Address(bytes);

        let has_lower = payload.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = payload.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper {
            let expected = parsed.to_checksum();
            if &expected[2..] != payload {
                return Err(AddressError::InvalidChecksum { expected });
            }
        }

        Ok(parsed)
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_BYTES] {
        &self.0
    }

    /// Lowercase `0x`-prefixed hex form.
    pub fn to_lower_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Canonical mixed-case checksummed form.
    ///
    /// A hex letter is uppercased when the matching nibble of
    /// `keccak256(lowercase_hex)` is 8 or greater.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let digest = Keccak256::digest(lower.as_bytes());

        let mut out = String::with_capacity(ADDRESS_STRING_LENGTH);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let byte = digest[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

/// Normalise any accepted address spelling to its checksummed form.
pub fn normalize_address(address: &str) -> Result<String, AddressError> {
    Address::parse(address).map(|a| a.to_checksum())
}

/// Check whether the provided string is a well-formed account address.
pub fn is_valid_address(address: &str) -> bool {
    Address::parse(address).is_ok()
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl From<[u8; ADDRESS_BYTES]> for Address {
    fn from(value: [u8; ADDRESS_BYTES]) -> Self {
        Address(value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_checksum()
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::parse(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference vectors from the mixed-case checksum proposal.
    const CHECKSUMMED: [&str; 4] = [
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn checksum_matches_reference_vectors() {
        for expected in CHECKSUMMED {
            let lower = expected.to_ascii_lowercase();
            let parsed = Address::parse(&lower).expect("lowercase parses");
            assert_eq!(parsed.to_checksum(), expected);
        }
    }

    #[test]
    fn checksummed_input_is_accepted() {
        for expected in CHECKSUMMED {
            assert!(is_valid_address(expected));
            assert_eq!(normalize_address(expected).unwrap(), expected);
        }
    }

    #[test]
    fn uppercase_payload_is_accepted() {
        let upper = format!("0x{}", CHECKSUMMED[0][2..].to_ascii_uppercase());
        assert_eq!(normalize_address(&upper).unwrap(), CHECKSUMMED[0]);
    }

    #[test]
    fn broken_checksum_rejected() {
        // flip the case of one letter
        let bad = "0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        let err = Address::parse(bad).unwrap_err();
        assert!(matches!(err, AddressError::InvalidChecksum { .. }));
    }

    #[test]
    fn invalid_prefix_rejected() {
        let bad = "5aaeb6053f3e94c9b9a09f33669435e7ef1beaed00";
        assert_eq!(Address::parse(bad).unwrap_err(), AddressError::InvalidPrefix);
    }

    #[test]
    fn invalid_length_rejected() {
        let err = Address::parse("0x1234").unwrap_err();
        assert!(matches!(err, AddressError::InvalidLength { expected: 42, actual: 6 }));
    }

    #[test]
    fn invalid_hex_rejected() {
        let bad = format!("0x{}", "zz".repeat(ADDRESS_BYTES));
        assert!(matches!(
            Address::parse(&bad).unwrap_err(),
            AddressError::InvalidHex(_)
        ));
    }

    #[test]
    fn serde_uses_checksummed_string() {
        let addr = Address::parse(CHECKSUMMED[1]).unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", CHECKSUMMED[1]));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
