//! End-to-end tests for in-place normalization of collection files.
//!
//! These tests exercise the real pipeline with real files on disk:
//! - write a collection file into a temp directory,
//! - run `fix_file` against it,
//! - re-parse the rewritten file and assert the observable contract
//!   (author rewrites, declaration, indentation, idempotence).

use bibfix_core::xml::{Document, Element};
use bibfix_core::{fix_file, CoreError};
use tempfile::TempDir;

// ===========================================================================
// Helpers
// ===========================================================================

fn write_collection(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn authors(paper: &Element) -> Vec<(String, String)> {
    paper
        .children_named("author")
        .map(|a| {
            (
                a.child_named("first")
                    .and_then(|e| e.text())
                    .unwrap_or_default()
                    .to_string(),
                a.child_named("last")
                    .and_then(|e| e.text())
                    .unwrap_or_default()
                    .to_string(),
            )
        })
        .collect()
}

const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<collection id="P19">
  <volume id="1">
    <paper id="1">
      <title>Single Author Paper</title>
      <author><first>Jane</first><last>Smith</last></author>
    </paper>
    <paper id="2">
      <title>Crowded Paper</title>
      <author><first>A</first><last>smith</last></author>
      <author><first>B</first><last>lee</last></author>
      <author><first>C</first><last>chen</last></author>
      <author><first>D</first><last>kim</last></author>
    </paper>
  </volume>
</collection>
"#;

// ===========================================================================
// Tests
// ===========================================================================

#[test]
fn fixes_collection_file_in_place() {
    let dir = TempDir::new().unwrap();
    let path = write_collection(&dir, "P19.xml", SAMPLE);

    let summary = fix_file(&path).unwrap();
    assert_eq!(summary.papers, 2);
    assert_eq!(summary.coauthors_injected, 1);
    assert_eq!(summary.authors_removed, 2);

    let doc = Document::from_file(&path).unwrap();
    let volume = doc.root.child_named("volume").unwrap();
    let papers: Vec<_> = volume.children_named("paper").collect();

    assert_eq!(
        authors(papers[0]),
        vec![
            ("Jane".to_string(), "SMITH".to_string()),
            ("Matt".to_string(), "POST".to_string()),
        ]
    );
    assert_eq!(
        authors(papers[1]),
        vec![
            ("A".to_string(), "SMITH".to_string()),
            ("B".to_string(), "LEE".to_string()),
        ]
    );
}

#[test]
fn written_file_has_declaration_and_stable_indentation() {
    let dir = TempDir::new().unwrap();
    let path = write_collection(&dir, "P19.xml", SAMPLE);

    fix_file(&path).unwrap();
    let first_pass = std::fs::read_to_string(&path).unwrap();

    assert!(first_pass.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    assert!(first_pass.contains("\n  <volume"));
    assert!(first_pass.contains("\n    <paper"));
    assert!(first_pass.contains("\n      <author>"));

    // A second run must neither inject another coauthor nor move a byte.
    let summary = fix_file(&path).unwrap();
    assert_eq!(summary.coauthors_injected, 0);
    assert_eq!(summary.authors_removed, 0);
    let second_pass = std::fs::read_to_string(&path).unwrap();
    assert_eq!(first_pass, second_pass);
}

#[test]
fn failing_file_is_left_unmodified() {
    let dir = TempDir::new().unwrap();
    let body = r#"<collection><paper id="X"><author><first>Solo</first></author></paper></collection>"#;
    let path = write_collection(&dir, "broken.xml", body);

    let err = fix_file(&path).unwrap_err();
    assert!(matches!(err, CoreError::Transform(_)));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), body);
}
