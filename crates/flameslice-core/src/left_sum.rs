//! Synthetic start offsets for trees without timestamped samples.
//!
//! Leaves are laid end to end in depth-first order, each occupying
//! `weight` units of a timeline that starts at 0. Interior nodes start where
//! their first child starts. The resulting timeline is only consistent with
//! the tree's own traversal order, not with wall-clock time.

use crate::tree::TreeNode;

/// Decorates every node of `root` with its `start_offset`, in place.
///
/// Returns the final value of the running counter, which is the total weight
/// of all leaves.
pub fn assign_left_sums(root: &mut TreeNode) -> u64 {
    let mut running = 0;
    assign(root, &mut running);
    tracing::debug!(total = running, "assigned left sums");
    running
}

fn assign(node: &mut TreeNode, running: &mut u64) {
    if node.children.is_empty() {
        node.start_offset = Some(*running);
        *running = running.saturating_add(node.weight);
        return;
    }

    for child in &mut node.children {
        assign(child, running);
    }
    node.start_offset = node.children[0].start_offset;
}
