//! Per-file pipeline: parse, normalize, write back in place.

use std::path::Path;

use tracing::info;

use crate::errors::CoreError;
use crate::transform::{normalize_paper_authors, TransformSummary};
use crate::xml::Document;

/// Normalize the author lists in one collection file, rewriting it in place.
///
/// The file is only written after the whole transformation succeeded; a
/// parse or transform failure leaves it untouched.
pub fn fix_file<P: AsRef<Path>>(path: P) -> Result<TransformSummary, CoreError> {
    let path = path.as_ref();
    info!(path = %path.display(), "normalizing author lists");

    let mut doc = Document::from_file(path)?;
    let summary = normalize_paper_authors(&mut doc)?;
    doc.write_to_file(path)?;

    Ok(summary)
}
