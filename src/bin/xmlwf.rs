//! Command-line well-formedness checker.
//!
//! Validates each given file as a complete XML document. Prints nothing on
//! success; reports the first unreadable or ill-formed file and exits
//! non-zero.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use xmltok::{validate_document, Token};

/// Check XML documents for well-formedness.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Documents to check.
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    for path in &args.files {
        let script = fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if !validate_document(Token::new(&script)) {
            bail!("{}: not a well-formed XML document", path.display());
        }
    }

    Ok(())
}
