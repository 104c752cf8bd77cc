//! bibfix command-line tool.
//!
//! Rewrites one or more bibliographic XML collection files in place,
//! normalizing the author list of every paper record: single-author papers
//! get the fixed coauthor appended, author lists are capped at two entries,
//! and every retained surname is upper-cased.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Normalize author lists in bibliographic XML collections.
#[derive(Parser, Debug)]
#[command(
    name = "bibfix",
    version,
    about = "Normalize author lists in bibliographic XML collection files"
)]
struct Cli {
    /// XML collection files to rewrite in place, processed in order.
    #[arg(required = true, value_name = "FILES")]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    // Minimal logging for the CLI; RUST_LOG overrides.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Process files strictly in the order given. The first failure aborts the
/// invocation; files already rewritten stay rewritten.
fn run(cli: Cli) -> Result<()> {
    for path in &cli.files {
        let summary = bibfix_core::fix_file(path)
            .with_context(|| format!("failed to process {}", path.display()))?;

        println!(
            "{}: {} paper(s), {} coauthor(s) injected, {} author(s) removed",
            path.display(),
            summary.papers,
            summary.coauthors_injected,
            summary.authors_removed,
        );
    }
    Ok(())
}
