use impact_types::AddressError;
use thiserror::Error;

/// Errors raised while encoding minter calls or decoding their reverts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MintError {
    #[error("invalid owner address {address:?}: {source}")]
    InvalidOwner {
        address: String,
        #[source]
        source: AddressError,
    },

    #[error("metadata URI must not be empty")]
    EmptyMetadataUri,

    #[error("total units must be positive")]
    ZeroUnits,

    #[error("unknown transfer restriction {0:?}")]
    UnknownRestriction(String),

    #[error("revert data is not valid hex: {0}")]
    InvalidRevertData(#[from] hex::FromHexError),
}

pub type Result<T> = std::result::Result<T, MintError>;
