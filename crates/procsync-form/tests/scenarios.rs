//! Tree move, insertion planning, and planner-driven YAML edits.

use procsync_form::{compare_trees, extract_form_tree, plan_insertion, ElementTree, Position};
use procsync_yaml::{emit, insert_item, resolve_container_mut, CommentPosition, Node};

fn form(body: &str) -> String {
    format!(
        r#"<Form xmlns="http://v8.1c.ru/8.3/xcf/logform"><ChildItems>{body}</ChildItems></Form>"#
    )
}

#[test]
fn field_moved_between_groups() {
    let original = form(
        r#"<UsualGroup name="GroupA"><ChildItems><InputField name="FieldX"/></ChildItems></UsualGroup>
           <UsualGroup name="GroupB"><ChildItems/></UsualGroup>"#,
    );
    let modified = form(
        r#"<UsualGroup name="GroupA"><ChildItems/></UsualGroup>
           <UsualGroup name="GroupB"><ChildItems><InputField name="FieldX"/></ChildItems></UsualGroup>"#,
    );
    let diff = compare_trees(&extract_form_tree(&original, 0), &extract_form_tree(&modified, 0));

    assert_eq!(diff.moved.len(), 1, "expected one move, got {:?}", diff.moved);
    let moved = &diff.moved[0];
    assert_eq!(moved.name, "FieldX");
    assert_eq!(moved.from_parent.as_deref(), Some("GroupA"));
    assert_eq!(moved.to_parent.as_deref(), Some("GroupB"));
    assert_eq!(moved.from_path.to_string(), "forms[0].elements[0].child_items[0]");
    assert_eq!(moved.to_path.to_string(), "forms[0].elements[1].child_items[0]");
    assert!(diff.added.is_empty() && diff.deleted.is_empty() && diff.modified.is_empty());
}

fn planner_tree() -> ElementTree {
    extract_form_tree(
        &form(
            r#"<UsualGroup name="Main"><ChildItems>
                 <InputField name="Leaf"/><InputField name="Other"/>
               </ChildItems></UsualGroup>"#,
        ),
        0,
    )
}

#[test]
fn planner_resolves_start_end_and_leaf() {
    let tree = planner_tree();

    let start = plan_insertion(&tree, Some("Main"), Position::Start).unwrap();
    assert_eq!(start.container.to_string(), "forms[0].elements[0].child_items");
    assert_eq!(start.index, 0);

    let end = plan_insertion(&tree, Some("Main"), "end".parse().unwrap()).unwrap();
    assert_eq!(end.container.to_string(), "forms[0].elements[0].child_items");
    assert_eq!(end.index, 2);

    assert!(plan_insertion(&tree, Some("Leaf"), Position::End).is_none());
}

#[test]
fn planned_insert_keeps_yaml_comments() {
    let tree = planner_tree();
    let mut config = Node::map_from_yaml_str(
        "forms:\n  - name: Form\n    elements:\n      - name: Main\n        child_items:\n          - name: Leaf\n          - name: Other\n",
    )
    .unwrap();

    let point = plan_insertion(&tree, Some("Main"), Position::Index(1)).unwrap();
    let seq = resolve_container_mut(&mut config, &point.container).unwrap();
    procsync_yaml::set_comment(seq, &1, "second field", CommentPosition::EndOfLine);
    insert_item(seq, point.index, Node::map_from_yaml_str("name: Inserted\n").unwrap());

    let text = emit(&Node::Map(config));
    assert!(text.contains("- name: Inserted\n"));
    assert!(text.contains("- name: Other # second field"));
}
