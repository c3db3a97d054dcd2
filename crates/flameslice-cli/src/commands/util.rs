//! Shared utilities for CLI commands.

use std::fs::File;
use std::io::{BufReader, stdin};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

use flameslice_core::{ProfileDocument, TreeNode};

/// Which of a counter's two roots to operate on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TreeChoice {
    /// Root 1, whose leaves carry timestamped samples.
    #[default]
    TimeOrdered,
    /// Root 0, siblings in traversal order.
    Traversal,
}

/// Reads a profile document from `path`, or from stdin if `path` is `-`.
pub fn load_document(path: &Path) -> Result<ProfileDocument> {
    if path == Path::new("-") {
        return ProfileDocument::from_reader(stdin().lock())
            .context("failed to parse profile document from stdin");
    }

    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    ProfileDocument::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Materializes the chosen root of `counter`.
pub fn select_tree(
    document: &ProfileDocument,
    counter: &str,
    choice: TreeChoice,
) -> Result<TreeNode> {
    let trees = document
        .counter_trees(counter)
        .with_context(|| format!("cannot load trees for counter {counter}"))?;

    Ok(match choice {
        TreeChoice::TimeOrdered => trees.time_ordered,
        TreeChoice::Traversal => trees.traversal_order,
    })
}
