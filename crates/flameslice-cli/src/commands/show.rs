//! Show command: print a counter's tree as an indented outline.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use flameslice_core::TreeNode;

use super::util::{TreeChoice, load_document, select_tree};
use crate::Config;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Profile document (JSON). Use `-` for stdin.
    pub input: PathBuf,

    /// Counter to show. Defaults to the configured counter.
    #[arg(long)]
    pub counter: Option<String>,

    /// Which of the counter's roots to show.
    #[arg(long, value_enum, default_value_t)]
    pub tree: TreeChoice,

    /// Stop descending below this depth.
    #[arg(long)]
    pub max_depth: Option<usize>,
}

pub fn run<W: Write>(writer: &mut W, args: &ShowArgs, config: &Config) -> Result<()> {
    let document = load_document(&args.input)?;
    let counter = args.counter.as_deref().unwrap_or(&config.counter);
    let root = select_tree(&document, counter, args.tree)?;

    render_tree(writer, &root, args.max_depth)
}

/// Writes `node` and its descendants, two spaces of indent per level.
pub fn render_tree<W: Write>(
    writer: &mut W,
    node: &TreeNode,
    max_depth: Option<usize>,
) -> Result<()> {
    render_node(writer, node, 0, max_depth)
}

fn render_node<W: Write>(
    writer: &mut W,
    node: &TreeNode,
    depth: usize,
    max_depth: Option<usize>,
) -> Result<()> {
    let marker = if node.cold { " [cold]" } else { "" };
    writeln!(
        writer,
        "{:indent$}{} ({}){marker}",
        "",
        node.name,
        node.weight,
        indent = depth * 2
    )?;

    if max_depth.is_some_and(|max| depth >= max) {
        return Ok(());
    }
    for child in &node.children {
        render_node(writer, child, depth + 1, max_depth)?;
    }
    Ok(())
}
