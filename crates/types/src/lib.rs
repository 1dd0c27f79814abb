//! Impact certificate data model
//!
//! Contribution records produced by the external indexer, the per-contributor
//! weights derived from them, and the integer allocation entries that end up
//! committed on-chain.

pub mod address;
pub mod allocation;
pub mod record;
pub mod units;

pub use address::*;
pub use allocation::*;
pub use record::*;
pub use units::*;
