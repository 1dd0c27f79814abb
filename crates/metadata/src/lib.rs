//! Certificate metadata for impact certificates
//!
//! Composes the published document from an author's draft, the contribution
//! records behind it and, optionally, the committed allocation.

pub mod composer;
pub mod document;
pub mod draft;
pub mod errors;
pub mod image;
pub mod validate;

pub use composer::*;
pub use document::*;
pub use draft::*;
pub use errors::*;
pub use image::*;
pub use validate::*;
