//! Counters command: list the counters stored in a profile document.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use flameslice_core::ProfileDocument;

use super::util::load_document;

#[derive(Debug, Args)]
pub struct CountersArgs {
    /// Profile document (JSON). Use `-` for stdin.
    pub input: PathBuf,
}

pub fn run<W: Write>(writer: &mut W, args: &CountersArgs) -> Result<()> {
    let document = load_document(&args.input)?;
    write_counters(writer, &document)
}

fn write_counters<W: Write>(writer: &mut W, document: &ProfileDocument) -> Result<()> {
    writeln!(writer, "first_time: {}", document.first_time())?;

    for counter in document.counter_names() {
        let roots = document.root_count(counter).unwrap_or(0);
        let note = if roots < 2 { " (unusable)" } else { "" };
        writeln!(writer, "{counter}: {roots} root(s){note}")?;
    }

    Ok(())
}
