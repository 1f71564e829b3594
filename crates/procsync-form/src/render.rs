//! ASCII rendering of element trees.

use crate::tree::{ElementNode, ElementTree};

/// Render `tree` one node per line using `├─` / `└─` / `│` guides.
///
/// Each line reads `<guides><marker> <name> (<type>)`, followed by
/// ` [<path>]` when `show_path` is set.
pub fn print_tree(tree: &ElementTree, show_path: bool) -> String {
    let mut lines = Vec::new();
    let roots: Vec<&ElementNode> = tree.roots().collect();
    for (i, root) in roots.iter().enumerate() {
        render_node(tree, root, "", i + 1 == roots.len(), show_path, &mut lines);
    }
    lines.join("\n")
}

fn render_node(
    tree: &ElementTree,
    node: &ElementNode,
    indent: &str,
    is_last: bool,
    show_path: bool,
    lines: &mut Vec<String>,
) {
    let marker = if is_last { "└─" } else { "├─" };
    let mut line = format!("{indent}{marker} {} ({})", node.name, node.element_type);
    if show_path {
        line.push_str(&format!(" [{}]", node.path));
    }
    lines.push(line);

    let child_indent = format!("{indent}{}", if is_last { "   " } else { "│  " });
    let children: Vec<&ElementNode> = tree.children(node.id).collect();
    for (i, child) in children.iter().enumerate() {
        render_node(tree, child, &child_indent, i + 1 == children.len(), show_path, lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ElementTree {
        let mut tree = ElementTree::new(0);
        let main = tree.add_root("Main", "UsualGroup");
        tree.add_child(main, "FieldA", "InputField").unwrap();
        let tabs = tree.add_child(main, "Tabs", "Pages").unwrap();
        tree.add_child(tabs, "Page1", "Page").unwrap();
        tree.add_root("Footer", "LabelDecoration");
        tree
    }

    #[test]
    fn renders_guides() {
        let expected = "\
├─ Main (UsualGroup)
│  ├─ FieldA (InputField)
│  └─ Tabs (Pages)
│     └─ Page1 (Page)
└─ Footer (LabelDecoration)";
        assert_eq!(print_tree(&sample(), false), expected);
    }

    #[test]
    fn renders_paths_on_request() {
        let text = print_tree(&sample(), true);
        assert!(text.starts_with("├─ Main (UsualGroup) [forms[0].elements[0]]"));
        assert!(text.contains("└─ Page1 (Page) [forms[0].elements[0].child_items[1].child_items[0]]"));
    }

    #[test]
    fn empty_tree_renders_nothing() {
        assert_eq!(print_tree(&ElementTree::new(0), true), "");
    }
}
