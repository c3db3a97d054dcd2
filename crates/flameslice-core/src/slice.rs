//! Slicing: the single entry point composing pruning and merging.

use crate::left_sum::assign_left_sums;
use crate::merge::merge;
use crate::policy::{OverlapPolicy, PolicyTable};
use crate::prune::{PruneMode, Window, prune};
use crate::tree::TreeNode;

/// Picks the prune mode a tree's shape supports.
///
/// Sample-bearing trees are clipped by sample. Everything else is clipped by
/// left sum, which [`slice`] assigns first if the tree has none yet.
pub fn select_mode(root: &TreeNode, policy: OverlapPolicy) -> PruneMode {
    if root.has_samples() {
        PruneMode::Samples(policy)
    } else {
        PruneMode::Offsets
    }
}

/// Restricts `root` to `window`.
///
/// With `preserve_time_order` the pruned tree is returned as is, so distinct
/// call instances stay distinct and ordered. Otherwise same-named siblings
/// are merged. Returns `None` if nothing falls inside the window.
///
/// A tree without samples or left sums is sliced on a decorated copy, so the
/// window applies to its traversal-order timeline.
pub fn slice(
    root: &TreeNode,
    window: Window,
    policy: OverlapPolicy,
    preserve_time_order: bool,
) -> Option<TreeNode> {
    let mode = select_mode(root, policy);
    if mode == PruneMode::Offsets && root.start_offset.is_none() {
        let mut decorated = root.clone();
        let total = assign_left_sums(&mut decorated);
        tracing::debug!(total, "no samples or left sums, slicing by traversal order");
        return slice_with_mode(&decorated, window, mode, preserve_time_order);
    }
    slice_with_mode(root, window, mode, preserve_time_order)
}

/// Like [`slice`], with an explicit prune mode.
pub fn slice_with_mode(
    root: &TreeNode,
    window: Window,
    mode: PruneMode,
    preserve_time_order: bool,
) -> Option<TreeNode> {
    tracing::debug!(
        left = window.left,
        right = window.right,
        ?mode,
        preserve_time_order,
        "slicing flame graph"
    );

    let pruned = prune(root, window, mode)?;
    tracing::debug!(
        weight = pruned.weight,
        nodes = pruned.node_count(),
        "pruned tree"
    );

    if preserve_time_order {
        Some(pruned)
    } else {
        Some(merge(pruned))
    }
}

/// Slices trees using a counter-name to policy mapping.
#[derive(Debug, Clone, Default)]
pub struct Slicer {
    policies: PolicyTable,
}

impl Slicer {
    pub const fn new(policies: PolicyTable) -> Self {
        Self { policies }
    }

    pub const fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    /// Slices `root`, choosing the overlap policy registered for `counter`.
    pub fn slice(
        &self,
        root: &TreeNode,
        window: Window,
        counter: &str,
        preserve_time_order: bool,
    ) -> Option<TreeNode> {
        let policy = self.policies.for_counter(counter);
        tracing::debug!(counter, %policy, "resolved overlap policy");
        slice(root, window, policy, preserve_time_order)
    }
}
