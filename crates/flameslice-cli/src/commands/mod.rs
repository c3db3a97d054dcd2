//! CLI subcommand implementations.

pub mod counters;
pub mod show;
pub mod slice;
pub mod util;
