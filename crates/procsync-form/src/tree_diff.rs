//! Structural diff of two element trees.
//!
//! Nodes are matched by name across the whole form. The differ reports
//! structure only: which names appeared or vanished, which moved to another
//! parent or sibling position, and which changed element type. A node may
//! be both moved and modified.

use procsync_types::{ElementChange, ElementPath};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tree::{ElementNode, ElementTree};

/// Entity kind used when tree changes are flattened into [`ElementChange`]s.
pub const FORM_ELEMENT: &str = "form_element";

/// A node present on one side only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub path: ElementPath,
    pub depth: usize,
    pub parent: Option<String>,
}

/// A node whose parent or sibling index differs between the trees.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMove {
    pub name: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub from_path: ElementPath,
    pub to_path: ElementPath,
    pub from_parent: Option<String>,
    pub to_parent: Option<String>,
    pub from_index: usize,
    pub to_index: usize,
}

/// A node whose element type differs between the trees.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTypeChange {
    pub name: String,
    /// Path on the modified side.
    pub path: ElementPath,
    pub old_type: String,
    pub new_type: String,
}

/// The four change buckets, each sorted by name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormTreeDiff {
    pub added: Vec<NodeSummary>,
    pub deleted: Vec<NodeSummary>,
    pub moved: Vec<NodeMove>,
    pub modified: Vec<NodeTypeChange>,
}

impl FormTreeDiff {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of entries across all buckets.
    pub fn len(&self) -> usize {
        self.added.len() + self.deleted.len() + self.moved.len() + self.modified.len()
    }

    /// Flatten the buckets into change records: added, deleted, moved,
    /// then type changes.
    pub fn to_changes(&self) -> Vec<ElementChange> {
        let mut changes = Vec::with_capacity(self.len());
        for node in &self.added {
            changes.push(
                ElementChange::added(FORM_ELEMENT, &node.name)
                    .with_location(node.path.to_string())
                    .with_parents(None, node.parent.clone())
                    .with_depth(node.depth),
            );
        }
        for node in &self.deleted {
            changes.push(
                ElementChange::deleted(FORM_ELEMENT, &node.name)
                    .with_location(node.path.to_string())
                    .with_parents(node.parent.clone(), None)
                    .with_depth(node.depth),
            );
        }
        for node in &self.moved {
            changes.push(
                ElementChange::moved(FORM_ELEMENT, &node.name)
                    .with_location(node.to_path.to_string())
                    .with_values(
                        Some(node.from_path.to_string().into()),
                        Some(node.to_path.to_string().into()),
                    )
                    .with_parents(node.from_parent.clone(), node.to_parent.clone())
                    .with_indices(Some(node.from_index), Some(node.to_index))
                    .with_depth(node.to_path.depth()),
            );
        }
        for node in &self.modified {
            changes.push(
                ElementChange::type_change(FORM_ELEMENT, &node.name, node.old_type.as_str(), node.new_type.as_str())
                    .with_location(node.path.to_string())
                    .with_depth(node.path.depth()),
            );
        }
        changes
    }
}

fn summarize(tree: &ElementTree, node: &ElementNode) -> NodeSummary {
    NodeSummary {
        name: node.name.clone(),
        element_type: node.element_type.clone(),
        path: node.path.clone(),
        depth: node.depth,
        parent: tree.parent_name(node.id).map(str::to_string),
    }
}

/// Compare two trees by element name.
pub fn compare_trees(old: &ElementTree, new: &ElementTree) -> FormTreeDiff {
    let old_flat = old.flatten();
    let new_flat = new.flatten();
    let mut diff = FormTreeDiff::default();

    for (name, node) in &new_flat {
        if !old_flat.contains_key(name) {
            diff.added.push(summarize(new, node));
        }
    }
    for (name, node) in &old_flat {
        if !new_flat.contains_key(name) {
            diff.deleted.push(summarize(old, node));
        }
    }

    for (name, before) in &old_flat {
        let Some(after) = new_flat.get(name) else {
            continue;
        };
        let from_parent = old.parent_name(before.id);
        let to_parent = new.parent_name(after.id);
        if from_parent != to_parent || before.index != after.index {
            diff.moved.push(NodeMove {
                name: name.to_string(),
                element_type: after.element_type.clone(),
                from_path: before.path.clone(),
                to_path: after.path.clone(),
                from_parent: from_parent.map(str::to_string),
                to_parent: to_parent.map(str::to_string),
                from_index: before.index,
                to_index: after.index,
            });
        }
        if before.element_type != after.element_type {
            diff.modified.push(NodeTypeChange {
                name: name.to_string(),
                path: after.path.clone(),
                old_type: before.element_type.clone(),
                new_type: after.element_type.clone(),
            });
        }
    }

    debug!(
        added = diff.added.len(),
        deleted = diff.deleted.len(),
        moved = diff.moved.len(),
        modified = diff.modified.len(),
        "form tree diff complete"
    );
    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use procsync_types::ChangeKind;

    fn tree(shape: &[(&str, &str, Option<&str>)]) -> ElementTree {
        let mut tree = ElementTree::new(0);
        for (name, element_type, parent) in shape {
            match parent.and_then(|p| tree.find(p)).map(|p| p.id) {
                Some(parent) => {
                    tree.add_child(parent, name, element_type).unwrap();
                }
                None => {
                    tree.add_root(name, element_type);
                }
            }
        }
        tree
    }

    #[test]
    fn identical_trees_no_changes() {
        let shape = [("Main", "UsualGroup", None), ("Field", "InputField", Some("Main"))];
        let diff = compare_trees(&tree(&shape), &tree(&shape));
        assert!(diff.is_empty());
        assert!(diff.to_changes().is_empty());
    }

    #[test]
    fn added_and_deleted_nodes() {
        let old = tree(&[("Main", "UsualGroup", None), ("Old", "InputField", Some("Main"))]);
        let new = tree(&[("Main", "UsualGroup", None), ("New", "InputField", Some("Main"))]);
        let diff = compare_trees(&old, &new);

        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].name, "New");
        assert_eq!(diff.added[0].parent.as_deref(), Some("Main"));
        assert_eq!(diff.added[0].depth, 1);
        assert_eq!(diff.deleted[0].name, "Old");
        assert!(diff.moved.is_empty());
    }

    #[test]
    fn sibling_reorder_is_a_move() {
        let old = tree(&[("A", "InputField", None), ("B", "InputField", None)]);
        let new = tree(&[("B", "InputField", None), ("A", "InputField", None)]);
        let diff = compare_trees(&old, &new);
        let moved: Vec<_> = diff.moved.iter().map(|m| (m.name.as_str(), m.from_index, m.to_index)).collect();
        assert_eq!(moved, vec![("A", 0, 1), ("B", 1, 0)]);
    }

    #[test]
    fn type_change_is_orthogonal_to_move() {
        let old = tree(&[("Main", "UsualGroup", None), ("X", "InputField", Some("Main"))]);
        let new = tree(&[("X", "LabelField", None), ("Main", "UsualGroup", None)]);
        let diff = compare_trees(&old, &new);

        assert_eq!(diff.modified.len(), 1);
        assert_eq!(diff.modified[0].old_type, "InputField");
        assert_eq!(diff.modified[0].new_type, "LabelField");
        assert!(diff.moved.iter().any(|m| m.name == "X" && m.to_parent.is_none()));
    }

    #[test]
    fn changes_are_flattened_in_bucket_order() {
        let old = tree(&[("Gone", "InputField", None), ("Kept", "InputField", None)]);
        let new = tree(&[("Kept", "LabelField", None), ("Fresh", "InputField", None)]);
        let changes = compare_trees(&old, &new).to_changes();
        let kinds: Vec<_> = changes.iter().map(|c| c.change_type).collect();
        assert_eq!(
            kinds,
            vec![ChangeKind::Added, ChangeKind::Deleted, ChangeKind::Moved, ChangeKind::TypeChange]
        );
        assert!(changes.iter().all(|c| c.element_type == FORM_ELEMENT));
        assert_eq!(changes[3].to_string(), "form_element 'Kept' type changed: InputField → LabelField");
    }

    #[test]
    fn serializes_type_field() {
        let old = ElementTree::new(0);
        let new = tree(&[("Main", "UsualGroup", None)]);
        let json = serde_json::to_value(compare_trees(&old, &new)).unwrap();
        assert_eq!(json["added"][0]["type"], "UsualGroup");
        assert_eq!(json["added"][0]["path"], "forms[0].elements[0]");
        assert!(json["added"][0]["parent"].is_null());
    }
}
