//! Core logic for slicing flame graphs by time window.
//!
//! This crate contains:
//! - Tree model: call tree nodes with optional samples or left sums
//! - Left sums: synthetic start offsets from traversal order
//! - Pruning: clipping a tree to `[left, right]` with per-counter overlap policies
//! - Merging: coalescing same-named siblings for display
//! - Profile documents: reading the per-counter tree roots

pub mod document;
mod left_sum;
mod merge;
pub mod policy;
mod prune;
mod slice;
mod tree;

pub use document::{CounterTrees, DocumentError, ProfileDocument};
pub use left_sum::assign_left_sums;
pub use merge::merge;
pub use policy::{OverlapPolicy, PolicyTable, UnknownPolicy};
pub use prune::{PruneMode, Window, prune};
pub use slice::{Slicer, select_mode, slice, slice_with_mode};
pub use tree::{Sample, TreeNode};
