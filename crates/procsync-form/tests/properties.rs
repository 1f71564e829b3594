//! Property tests over generated element trees.

use procsync_form::{compare_trees, ElementTree};
use proptest::prelude::*;

/// Node `i` attaches under the container chosen by `parents[i]`, or at the
/// top level. Names are unique per tree.
fn build(shape: &[(Option<usize>, bool)], prefix: &str) -> ElementTree {
    let mut tree = ElementTree::new(0);
    let mut containers = Vec::new();
    for (i, (parent, container)) in shape.iter().enumerate() {
        let name = format!("{prefix}{i}");
        let element_type = if *container { "UsualGroup" } else { "InputField" };
        let id = match parent.filter(|_| !containers.is_empty()) {
            Some(pick) => tree
                .add_child(containers[pick % containers.len()], &name, element_type)
                .unwrap(),
            None => tree.add_root(&name, element_type),
        };
        if *container {
            containers.push(id);
        }
    }
    tree
}

fn shape() -> impl Strategy<Value = Vec<(Option<usize>, bool)>> {
    proptest::collection::vec((proptest::option::of(0usize..16), any::<bool>()), 0..16)
}

proptest! {
    #[test]
    fn paths_are_unique_and_reparse(shape in shape()) {
        let tree = build(&shape, "n");
        let mut seen = std::collections::BTreeSet::new();
        for (name, node) in tree.flatten() {
            prop_assert!(seen.insert(node.path.to_string()));
            let reparsed = node.path.to_string().parse().unwrap();
            let found = tree.node_at(&reparsed).map(|n| n.name.as_str());
            prop_assert_eq!(found, Some(name));
        }
    }

    #[test]
    fn diff_is_symmetric(a in shape(), b in shape()) {
        let (left, right) = (build(&a, "n"), build(&b, "n"));
        let forward = compare_trees(&left, &right);
        let backward = compare_trees(&right, &left);
        let names = |nodes: &[procsync_form::NodeSummary]| {
            nodes.iter().map(|n| n.name.clone()).collect::<Vec<_>>()
        };
        prop_assert_eq!(names(&forward.added), names(&backward.deleted));
        prop_assert!(compare_trees(&left, &left).is_empty());
    }

    #[test]
    fn diff_is_deterministic(a in shape(), b in shape()) {
        let (left, right) = (build(&a, "n"), build(&b, "n"));
        let first = serde_json::to_string(&compare_trees(&left, &right)).unwrap();
        let second = serde_json::to_string(&compare_trees(&left, &right)).unwrap();
        prop_assert_eq!(first, second);
    }
}
