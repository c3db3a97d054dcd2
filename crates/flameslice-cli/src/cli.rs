//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::counters::CountersArgs;
use crate::commands::show::ShowArgs;
use crate::commands::slice::SliceArgs;

/// Flame graph time-window slicer.
///
/// Restricts a profiler's call tree to a time window, recomputing node
/// weights for the part of each call that falls inside it.
#[derive(Debug, Parser)]
#[command(name = "flameslice", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Restrict a counter's tree to a time window.
    Slice(SliceArgs),

    /// Print a counter's tree as an indented outline.
    Show(ShowArgs),

    /// List the counters stored in a profile document.
    Counters(CountersArgs),
}
