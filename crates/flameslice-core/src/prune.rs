//! Interval pruning: clip a call tree to a time window.
//!
//! Pruning never mutates its input. A subtree that contributes nothing to the
//! window is reported as `None` and must be omitted from its parent.
//!
//! # Modes
//!
//! - [`PruneMode::Samples`]: leaves carry timestamped samples, which are
//!   classified against the window according to an [`OverlapPolicy`].
//! - [`PruneMode::Offsets`]: nodes carry a synthetic `start_offset` and the
//!   window is applied to `[start_offset, start_offset + weight]` directly.
//!
//! In both modes an interior node's weight is recomputed as the sum of its
//! surviving children.

use rayon::prelude::*;

use crate::policy::OverlapPolicy;
use crate::tree::{Sample, TreeNode};

/// Closed time window `[left, right]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    pub left: u64,
    pub right: u64,
}

impl Window {
    pub const fn new(left: u64, right: u64) -> Self {
        Self { left, right }
    }

    /// Moves both bounds forward by `baseline`, e.g. a profile's `first_time`.
    #[must_use]
    pub const fn shifted(self, baseline: u64) -> Self {
        Self {
            left: self.left.saturating_add(baseline),
            right: self.right.saturating_add(baseline),
        }
    }

    pub const fn is_inverted(&self) -> bool {
        self.left > self.right
    }

    pub const fn contains(&self, timestamp: u64) -> bool {
        self.left <= timestamp && timestamp <= self.right
    }

    /// Fast-reject test for a span `[start, end]`.
    const fn overlaps(&self, start: u64, end: u64) -> bool {
        !(end <= self.left || start >= self.right)
    }
}

/// Which representation of time the pruner reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneMode {
    /// Leaves carry samples; partial overlap follows the given policy.
    Samples(OverlapPolicy),
    /// Nodes carry `start_offset` from [`crate::assign_left_sums`].
    Offsets,
}

/// Clips `node` to `window`, returning `None` if nothing remains.
pub fn prune(node: &TreeNode, window: Window, mode: PruneMode) -> Option<TreeNode> {
    match mode {
        PruneMode::Samples(policy) => prune_samples(node, window, policy),
        PruneMode::Offsets => prune_offsets(node, window),
    }
}

/// How a single sample relates to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SampleFit {
    Inside,
    /// Kept, but `excess` units of it lie outside the window.
    Straddles { excess: u64 },
    Outside,
}

fn classify(sample: &Sample, window: Window, policy: OverlapPolicy) -> SampleFit {
    let start = sample.start();
    let end = sample.timestamp;

    match policy {
        OverlapPolicy::TimestampOnly => {
            if window.contains(end) {
                SampleFit::Inside
            } else {
                SampleFit::Outside
            }
        }
        OverlapPolicy::Proportional => {
            if start < window.left && end >= window.left {
                // A span covering the whole window is clipped on both sides.
                let excess = (window.left - start) + end.saturating_sub(window.right);
                SampleFit::Straddles { excess }
            } else if start < window.right && end >= window.right {
                SampleFit::Straddles {
                    excess: end - window.right,
                }
            } else if end < window.left || end > window.right {
                SampleFit::Outside
            } else {
                SampleFit::Inside
            }
        }
    }
}

fn prune_samples(node: &TreeNode, window: Window, policy: OverlapPolicy) -> Option<TreeNode> {
    if node.is_leaf() {
        return clip_leaf(node, window, policy);
    }

    let children = node
        .children
        .par_iter()
        .filter_map(|child| prune_samples(child, window, policy))
        .collect();
    rebuild(node, children)
}

fn clip_leaf(node: &TreeNode, window: Window, policy: OverlapPolicy) -> Option<TreeNode> {
    let mut excess: u64 = 0;
    let mut samples = Vec::with_capacity(node.samples.len());

    for sample in &node.samples {
        match classify(sample, window, policy) {
            SampleFit::Inside => samples.push(*sample),
            SampleFit::Straddles { excess: clipped } => {
                excess = excess.saturating_add(clipped);
                samples.push(*sample);
            }
            SampleFit::Outside => excess = excess.saturating_add(sample.duration),
        }
    }

    if excess > node.weight {
        tracing::warn!(
            name = %node.name,
            weight = node.weight,
            excess,
            "samples outweigh their leaf"
        );
    }

    let weight = node.weight.saturating_sub(excess);
    if weight == 0 {
        return None;
    }

    Some(TreeNode {
        name: node.name.clone(),
        weight,
        cold: node.cold,
        start_offset: node.start_offset,
        samples,
        children: Vec::new(),
    })
}

fn prune_offsets(node: &TreeNode, window: Window) -> Option<TreeNode> {
    if node.is_leaf() {
        return clip_offset_span(node, window);
    }

    let children = node
        .children
        .par_iter()
        .filter(|child| {
            let start = child.start_offset.unwrap_or(0);
            window.overlaps(start, start.saturating_add(child.weight))
        })
        .filter_map(|child| prune_offsets(child, window))
        .collect();
    rebuild(node, children)
}

fn clip_offset_span(node: &TreeNode, window: Window) -> Option<TreeNode> {
    let start = node.start_offset.unwrap_or(0);
    let end = start.saturating_add(node.weight);
    let excess_left = window.left.saturating_sub(start);
    let excess_right = end.saturating_sub(window.right);
    let excess = excess_left.saturating_add(excess_right);

    if excess >= node.weight {
        return None;
    }

    Some(TreeNode {
        weight: node.weight - excess,
        ..node.clone()
    })
}

/// Reassembles an interior node from its pruned children.
fn rebuild(node: &TreeNode, children: Vec<TreeNode>) -> Option<TreeNode> {
    let weight: u64 = children.iter().map(|c| c.weight).sum();
    if weight == 0 && children.is_empty() {
        return None;
    }

    Some(TreeNode {
        name: node.name.clone(),
        weight,
        cold: node.cold,
        start_offset: node.start_offset,
        samples: node.samples.clone(),
        children,
    })
}
