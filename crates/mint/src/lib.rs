//! Minter contract plumbing for impact certificates
//!
//! Encodes the `createAllowlist` call that mints a certificate against a
//! committed allowlist root, and decodes the revert data the minter returns
//! when it refuses. Pure encoding only: nothing here signs or broadcasts.

pub mod encoder;
pub mod errors;
pub mod revert;

pub use encoder::*;
pub use errors::*;
pub use revert::*;
