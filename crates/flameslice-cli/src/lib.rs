//! Flame graph slicer CLI library.
//!
//! This crate provides the CLI interface for `flameslice-core`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
