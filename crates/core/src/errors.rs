//! Error types for the bibfix core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them for callers that want a single
//! error type.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

// ---------------------------------------------------------------------------
// XML document I/O errors
// ---------------------------------------------------------------------------

/// Errors from parsing and serializing XML collection files.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The file could not be read or written.
    #[error("XML I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input is not well-formed XML.
    #[error("failed to parse XML: {0}")]
    Parse(String),

    /// The document ended without a root element.
    #[error("document has no root element")]
    NoRootElement,

    /// A closing tag did not match the element currently open.
    #[error("mismatched closing tag </{found}>, expected </{expected}>")]
    MismatchedTag { expected: String, found: String },

    /// The tree could not be written back out.
    #[error("failed to serialize XML: {0}")]
    Serialize(String),
}

// ---------------------------------------------------------------------------
// Record transformation errors
// ---------------------------------------------------------------------------

/// Errors from the author-list transformation pass.
#[derive(Debug, Error)]
pub enum TransformError {
    /// An author record has no `<last>` element (or an empty one).
    /// This is a structural precondition violation; the file is abandoned.
    #[error("author without a <last> name in paper '{paper_id}'")]
    MissingLastName { paper_id: String },
}
