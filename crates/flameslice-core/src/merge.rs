//! Sibling merging: coalesce same-named children at every level.
//!
//! Groups are emitted in first-seen order so output is deterministic.
//! Merged nodes drop their samples, since timestamps from several call
//! instances no longer describe one contiguous span.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::tree::TreeNode;

/// Merges same-named siblings throughout `node`'s subtree.
///
/// Applying `merge` to an already merged tree returns it unchanged.
pub fn merge(mut node: TreeNode) -> TreeNode {
    let children = coalesce(std::mem::take(&mut node.children));
    node.children = children.into_par_iter().map(merge).collect();
    node
}

/// Folds `children` into one node per distinct name, keeping first-seen order.
fn coalesce(children: Vec<TreeNode>) -> Vec<TreeNode> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(children.len());
    let mut merged: Vec<TreeNode> = Vec::with_capacity(children.len());

    for child in children {
        if let Some(&i) = index.get(&child.name) {
            absorb(&mut merged[i], child);
        } else {
            index.insert(child.name.clone(), merged.len());
            merged.push(child);
        }
    }

    merged
}

/// The first-seen node keeps its `cold` flag and `start_offset`.
fn absorb(target: &mut TreeNode, source: TreeNode) {
    target.weight = target.weight.saturating_add(source.weight);
    target.samples.clear();
    target.children.extend(source.children);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Sample;

    fn weighted(name: &str, weight: u64) -> TreeNode {
        TreeNode {
            name: name.to_string(),
            weight,
            ..TreeNode::default()
        }
    }

    fn names(node: &TreeNode) -> Vec<&str> {
        node.children.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn same_named_siblings_are_summed_and_concatenated() {
        let root = TreeNode::with_children(
            "root",
            vec![
                TreeNode::with_children("A", vec![weighted("x", 4), weighted("y", 6)]),
                TreeNode::with_children("A", vec![weighted("z", 5)]),
            ],
        );

        let merged = merge(root);

        assert_eq!(merged.children.len(), 1);
        let a = &merged.children[0];
        assert_eq!(a.name, "A");
        assert_eq!(a.weight, 15);
        assert_eq!(names(a), vec!["x", "y", "z"]);
    }

    #[test]
    fn output_follows_first_seen_order() {
        let root = TreeNode::with_children(
            "root",
            vec![
                weighted("c", 1),
                weighted("a", 1),
                weighted("c", 1),
                weighted("b", 1),
                weighted("a", 1),
            ],
        );

        let merged = merge(root);

        assert_eq!(names(&merged), vec!["c", "a", "b"]);
        assert_eq!(merged.children[0].weight, 2);
        assert_eq!(merged.children[1].weight, 2);
        assert_eq!(merged.children[2].weight, 1);
        assert_eq!(merged.weight, 5);
    }

    #[test]
    fn concatenated_grandchildren_are_merged_too() {
        let root = TreeNode::with_children(
            "root",
            vec![
                TreeNode::with_children("A", vec![weighted("leaf", 2)]),
                TreeNode::with_children("A", vec![weighted("leaf", 3)]),
            ],
        );

        let merged = merge(root);

        let a = &merged.children[0];
        assert_eq!(a.children.len(), 1);
        assert_eq!(a.children[0].name, "leaf");
        assert_eq!(a.children[0].weight, 5);
    }

    #[test]
    fn merged_nodes_drop_samples_and_keep_first_flags() {
        let mut first = TreeNode::leaf("A", vec![Sample::new(10, 10)]).cold(true);
        first.start_offset = Some(3);
        let second = TreeNode::leaf("A", vec![Sample::new(30, 5)]);
        let lone = TreeNode::leaf("B", vec![Sample::new(50, 7)]);
        let root = TreeNode::with_children("root", vec![first, second, lone]);

        let merged = merge(root);

        let a = &merged.children[0];
        assert_eq!(a.weight, 15);
        assert!(a.samples.is_empty());
        assert!(a.cold);
        assert_eq!(a.start_offset, Some(3));

        // Single-member groups are untouched.
        assert_eq!(merged.children[1].samples, vec![Sample::new(50, 7)]);
    }

    #[test]
    fn merge_is_idempotent() {
        let root = TreeNode::with_children(
            "root",
            vec![
                TreeNode::with_children("A", vec![weighted("x", 1), weighted("x", 2)]),
                weighted("B", 3),
                TreeNode::with_children("A", vec![weighted("y", 4), weighted("x", 5)]),
            ],
        );

        let once = merge(root);
        let twice = merge(once.clone());

        assert_eq!(once, twice);
        assert_eq!(names(&once.children[0]), vec!["x", "y"]);
        assert_eq!(once.children[0].children[0].weight, 8);
    }

    #[test]
    fn merged_tree_serializes_in_node_schema() {
        let root = TreeNode::with_children(
            "root",
            vec![
                TreeNode::leaf("A", vec![Sample::new(10, 10)]).cold(true),
                TreeNode::leaf("B", vec![Sample::new(25, 5)]),
                TreeNode::leaf("A", vec![Sample::new(40, 15)]),
            ],
        );

        let json = serde_json::to_string(&merge(root)).unwrap();

        insta::assert_snapshot!(json, @r#"{"name":"root","value":30,"cold":false,"children":[{"name":"A","value":25,"cold":true,"children":[]},{"name":"B","value":5,"cold":false,"samples":[{"timestamp":25,"period":5}],"children":[]}]}"#);
    }

    #[test]
    fn siblings_are_distinct_after_merge() {
        let root = TreeNode::with_children(
            "root",
            vec![weighted("", 1), weighted("", 2), weighted("main", 3)],
        );

        let merged = merge(root);

        assert_eq!(names(&merged), vec!["", "main"]);
        assert_eq!(merged.children[0].weight, 3);
    }
}
