//! bibfix core library.
//!
//! This crate provides the components for batch author-list normalization of
//! bibliographic XML collections: the mutable document tree and its
//! parser/serializer, the record transformer, and the per-file driver.

pub mod driver;
pub mod errors;
pub mod transform;
pub mod xml;

// Re-exports for convenience.
pub use driver::fix_file;
pub use errors::{CoreError, TransformError, XmlError};
pub use transform::{normalize_paper_authors, TransformSummary};
pub use xml::{Document, Element, Node};
