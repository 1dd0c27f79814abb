//! Impact certificate allocation core
//!
//! Records flow strictly downward through this crate:
//!
//! records -> [`build_contributor_stats`] -> [`distribute`] ->
//! [`validate_allowlist`] -> [`build_tree`] -> root and per-recipient proofs
//!
//! Everything is synchronous and pure. Identical ordered inputs always give a
//! bit-identical allocation and Merkle root.

pub mod aggregation;
pub mod allowlist;
pub mod commitment;
pub mod distribution;
pub mod errors;

pub use aggregation::*;
pub use allowlist::*;
pub use commitment::*;
pub use distribution::*;
pub use errors::*;
