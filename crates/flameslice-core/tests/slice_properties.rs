//! Property-based tests for pruning and merging.

use std::collections::HashSet;

use flameslice_core::{
    OverlapPolicy, PruneMode, Sample, TreeNode, Window, assign_left_sums, merge, prune, slice,
};
use proptest::prelude::*;

fn arb_sample() -> impl Strategy<Value = Sample> {
    (0u64..1000, 0u64..100).prop_map(|(timestamp, duration)| Sample::new(timestamp, duration))
}

fn arb_leaf() -> impl Strategy<Value = TreeNode> {
    (
        "[a-c]",
        prop::collection::vec(arb_sample(), 0..4),
        any::<bool>(),
    )
        .prop_map(|(name, samples, cold)| TreeNode::leaf(name, samples).cold(cold))
}

fn arb_tree() -> impl Strategy<Value = TreeNode> {
    arb_leaf().prop_recursive(4, 48, 4, |inner| {
        ("[a-c]", prop::collection::vec(inner, 1..4))
            .prop_map(|(name, children)| TreeNode::with_children(name, children))
    })
}

fn arb_policy() -> impl Strategy<Value = OverlapPolicy> {
    prop_oneof![
        Just(OverlapPolicy::Proportional),
        Just(OverlapPolicy::TimestampOnly),
    ]
}

/// Four sorted points: `[b, c]` nested inside `[a, d]`.
fn arb_nested_windows() -> impl Strategy<Value = (Window, Window)> {
    prop::array::uniform4(0u64..1200).prop_map(|mut points| {
        points.sort_unstable();
        (
            Window::new(points[1], points[2]),
            Window::new(points[0], points[3]),
        )
    })
}

fn pruned_weight(tree: &TreeNode, window: Window, mode: PruneMode) -> u64 {
    prune(tree, window, mode).map_or(0, |t| t.weight)
}

fn assert_weights_consistent(node: &TreeNode) {
    if !node.is_leaf() {
        assert_eq!(node.weight, node.children_weight(), "node {}", node.name);
    }
    for child in &node.children {
        assert_weights_consistent(child);
    }
}

fn assert_siblings_distinct(node: &TreeNode) {
    let names: HashSet<_> = node.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names.len(), node.children.len());
    for child in &node.children {
        assert_siblings_distinct(child);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_containing_window_conserves_weight(tree in arb_tree(), policy in arb_policy()) {
        let weight = pruned_weight(&tree, Window::new(0, 2000), PruneMode::Samples(policy));
        prop_assert_eq!(weight, tree.weight);
    }

    #[test]
    fn prop_pruned_weight_is_bounded(
        tree in arb_tree(),
        policy in arb_policy(),
        (inner, _) in arb_nested_windows(),
    ) {
        if let Some(pruned) = prune(&tree, inner, PruneMode::Samples(policy)) {
            prop_assert!(pruned.weight <= tree.weight);
            prop_assert!(pruned.weight > 0 || !pruned.children.is_empty());
            assert_weights_consistent(&pruned);
        }
    }

    #[test]
    fn prop_widening_never_decreases_weight(
        tree in arb_tree(),
        policy in arb_policy(),
        (inner, outer) in arb_nested_windows(),
    ) {
        let mode = PruneMode::Samples(policy);
        prop_assert!(pruned_weight(&tree, inner, mode) <= pruned_weight(&tree, outer, mode));
    }

    #[test]
    fn prop_offsets_conserve_and_are_monotonic(
        tree in arb_tree(),
        (inner, outer) in arb_nested_windows(),
    ) {
        let mut tree = tree;
        let total = assign_left_sums(&mut tree);

        prop_assert_eq!(
            pruned_weight(&tree, Window::new(0, total), PruneMode::Offsets),
            tree.weight
        );
        prop_assert!(
            pruned_weight(&tree, inner, PruneMode::Offsets)
                <= pruned_weight(&tree, outer, PruneMode::Offsets)
        );
    }

    #[test]
    fn prop_merge_is_idempotent(tree in arb_tree()) {
        let once = merge(tree);
        let twice = merge(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_merge_conserves_weight_and_dedups(tree in arb_tree()) {
        let weight = tree.weight;
        let merge_input_children_weight = tree.children_weight();
        let merged = merge(tree);
        prop_assert_eq!(merged.weight, weight);
        prop_assert_eq!(merged.children_weight(), merge_input_children_weight);
        assert_siblings_distinct(&merged);
    }

    #[test]
    fn prop_slice_is_deterministic(
        tree in arb_tree(),
        policy in arb_policy(),
        (window, _) in arb_nested_windows(),
        preserve in any::<bool>(),
    ) {
        let first = slice(&tree, window, policy, preserve);
        let second = slice(&tree, window, policy, preserve);
        prop_assert_eq!(first, second);
    }
}

#[test]
fn end_to_end_scenario_keeps_weights() {
    let a = TreeNode {
        name: "A".to_string(),
        weight: 10,
        samples: vec![Sample::new(100, 1), Sample::new(200, 2)],
        ..TreeNode::default()
    };
    let b = TreeNode {
        name: "B".to_string(),
        weight: 20,
        cold: true,
        samples: vec![Sample::new(600, 6)],
        ..TreeNode::default()
    };
    let root = TreeNode::with_children("root", vec![a, b]);

    let sliced = slice(
        &root,
        Window::new(0, 1_000_000),
        OverlapPolicy::TimestampOnly,
        false,
    )
    .unwrap();

    assert_eq!(sliced.weight, 30);
    assert_eq!(sliced.children[0].weight, 10);
    assert_eq!(sliced.children[1].weight, 20);
    assert!(sliced.children[1].cold);
}
