//! Author-list normalization for paper records.
//!
//! One pass over every `<paper>` element in a collection:
//!
//! - a paper with exactly one author gets the fixed coauthor inserted right
//!   after the original author;
//! - a paper with more than two authors keeps only the first two;
//! - every retained author's `<last>` name is upper-cased.
//!
//! Decision inputs (the author positions and their count) are frozen before
//! any mutation, so insertions and removals cannot change the outcome for
//! later authors.

use tracing::debug;

use crate::errors::TransformError;
use crate::xml::{Document, Element, Node};

/// First name of the coauthor injected into single-author papers.
pub const COAUTHOR_FIRST: &str = "Matt";
/// Last name of the injected coauthor, already upper-cased.
pub const COAUTHOR_LAST: &str = "POST";

/// Counters describing what one normalization pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformSummary {
    /// Papers visited.
    pub papers: usize,
    /// Coauthors inserted into single-author papers.
    pub coauthors_injected: usize,
    /// Authors removed from papers with more than two.
    pub authors_removed: usize,
    /// Surnames rewritten to their upper-cased form.
    pub surnames_uppercased: usize,
}

/// Normalize the author list of every paper in the document, in place.
///
/// Fails on the first author encountered without a usable `<last>` name;
/// the document may be partially mutated at that point and must not be
/// written back.
pub fn normalize_paper_authors(doc: &mut Document) -> Result<TransformSummary, TransformError> {
    let mut summary = TransformSummary::default();
    visit_papers(&mut doc.root, &mut |paper| fix_paper(paper, &mut summary))?;
    debug!(
        papers = summary.papers,
        injected = summary.coauthors_injected,
        removed = summary.authors_removed,
        uppercased = summary.surnames_uppercased,
        "author lists normalized"
    );
    Ok(summary)
}

/// Apply `f` to every `<paper>` element below `el`, in document order.
fn visit_papers<F>(el: &mut Element, f: &mut F) -> Result<(), TransformError>
where
    F: FnMut(&mut Element) -> Result<(), TransformError>,
{
    for child in el.children.iter_mut() {
        if let Node::Element(e) = child {
            if e.name == "paper" {
                f(e)?;
            }
            visit_papers(e, f)?;
        }
    }
    Ok(())
}

fn fix_paper(paper: &mut Element, summary: &mut TransformSummary) -> Result<(), TransformError> {
    summary.papers += 1;

    // Snapshot the original author positions before touching anything.
    let author_positions: Vec<usize> = paper
        .children
        .iter()
        .enumerate()
        .filter_map(|(idx, child)| match child {
            Node::Element(e) if e.name == "author" => Some(idx),
            _ => None,
        })
        .collect();
    let n_authors = author_positions.len();

    if n_authors == 0 {
        // Nothing to normalize; leave the paper untouched.
        return Ok(());
    }

    let paper_id = paper.attr("id").unwrap_or("<no id>").to_string();

    // Upper-case the surnames of the retained authors (the first two).
    for &pos in author_positions.iter().take(2) {
        let author = match &mut paper.children[pos] {
            Node::Element(e) => e,
            _ => unreachable!("snapshot positions point at author elements"),
        };
        uppercase_last(author, &paper_id)?;
        summary.surnames_uppercased += 1;
    }

    if n_authors == 1 {
        let mut coauthor = Element::new("author");
        coauthor.append_simple("first", Some(COAUTHOR_FIRST));
        coauthor.append_simple("last", Some(COAUTHOR_LAST));
        paper
            .children
            .insert(author_positions[0] + 1, Node::Element(coauthor));
        summary.coauthors_injected += 1;
    } else if n_authors > 2 {
        debug!(
            paper = %paper_id,
            removed = n_authors - 2,
            "trimming author list to two entries"
        );
        // Remove back-to-front so the earlier snapshot indices stay valid.
        for &pos in author_positions[2..].iter().rev() {
            paper.children.remove(pos);
        }
        summary.authors_removed += n_authors - 2;
    }

    Ok(())
}

fn uppercase_last(author: &mut Element, paper_id: &str) -> Result<(), TransformError> {
    let last = author
        .child_named_mut("last")
        .ok_or_else(|| TransformError::MissingLastName {
            paper_id: paper_id.to_string(),
        })?;
    let upper = match last.text() {
        Some(t) => t.to_uppercase(),
        None => {
            return Err(TransformError::MissingLastName {
                paper_id: paper_id.to_string(),
            })
        }
    };
    last.set_text(upper);
    Ok(())
}
