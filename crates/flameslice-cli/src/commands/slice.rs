//! Implementation of the `flameslice slice` command.
//!
//! Loads one counter's tree from a profile document, restricts it to the
//! requested window and writes the result as JSON in the document's node
//! schema (`value`, `left_sum`, `samples`).

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;

use flameslice_core::{
    OverlapPolicy, PruneMode, Slicer, TreeNode, Window, assign_left_sums, slice_with_mode,
};

use super::show::render_tree;
use super::util::{TreeChoice, load_document, select_tree};
use crate::Config;

#[derive(Debug, Args)]
pub struct SliceArgs {
    /// Profile document (JSON). Use `-` for stdin.
    pub input: PathBuf,

    /// Start of the window.
    #[arg(long)]
    pub left: u64,

    /// End of the window.
    #[arg(long)]
    pub right: u64,

    /// Counter to slice. Defaults to the configured counter.
    #[arg(long)]
    pub counter: Option<String>,

    /// Which of the counter's roots to slice.
    #[arg(long, value_enum, default_value_t)]
    pub tree: TreeChoice,

    /// Keep call instances distinct and in time order instead of merging siblings.
    #[arg(long)]
    pub time_ordered: bool,

    /// Slice by left sums computed from traversal order instead of by samples.
    #[arg(long)]
    pub offsets: bool,

    /// Treat --left and --right as relative to the document's `first_time`.
    #[arg(long)]
    pub relative: bool,

    /// Overlap policy for this run (proportional, timestamp-only).
    #[arg(long)]
    pub policy: Option<OverlapPolicy>,

    /// Write JSON here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit single-line JSON.
    #[arg(long)]
    pub compact: bool,

    /// Also print the sliced tree as an outline.
    #[arg(long)]
    pub print: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &SliceArgs, config: &Config) -> Result<()> {
    if args.left > args.right {
        bail!(
            "--left ({}) must not be greater than --right ({})",
            args.left,
            args.right
        );
    }

    let document = load_document(&args.input)?;
    let counter = args.counter.as_deref().unwrap_or(&config.counter);
    let mut root = select_tree(&document, counter, args.tree)?;

    // Left sums count from 0, so `first_time` means nothing to them.
    let by_offsets = args.offsets || !root.has_samples();
    if args.relative && by_offsets {
        bail!("--relative only applies to sample timestamps, but this tree is sliced by left sums");
    }

    let mut window = Window::new(args.left, args.right);
    if args.relative {
        window = window.shifted(document.first_time());
    }

    let mut policies = config.policies.clone();
    if let Some(policy) = args.policy {
        policies.counters.insert(counter.to_string(), policy);
    }

    let sliced = if args.offsets {
        let total = assign_left_sums(&mut root);
        tracing::debug!(total, "slicing by left sums");
        slice_with_mode(&root, window, PruneMode::Offsets, args.time_ordered)
    } else {
        Slicer::new(policies).slice(&root, window, counter, args.time_ordered)
    };

    let sliced = sliced.unwrap_or_else(|| {
        tracing::info!(
            left = window.left,
            right = window.right,
            "nothing falls inside the window"
        );
        root.emptied()
    });

    write_json(writer, &sliced, args, config)?;

    if args.print {
        render_tree(writer, &sliced, None)?;
    }

    Ok(())
}

fn write_json<W: Write>(
    writer: &mut W,
    tree: &TreeNode,
    args: &SliceArgs,
    config: &Config,
) -> Result<()> {
    let json = if config.pretty && !args.compact {
        serde_json::to_string_pretty(tree)
    } else {
        serde_json::to_string(tree)
    }
    .context("failed to serialize sliced tree")?;

    match &args.output {
        Some(path) => {
            fs::write(path, format!("{json}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::debug!(path = %path.display(), "wrote sliced tree");
        }
        None => writeln!(writer, "{json}")?,
    }

    Ok(())
}
