//! Comment shifting across whole-document edits.

use procsync_yaml::{
    delete_item, emit, get_comment, insert_item, set_comment, CommentPosition, CommentedSeq, Node,
};

fn items(seq: &CommentedSeq) -> Vec<&str> {
    seq.iter().filter_map(Node::as_str).collect()
}

#[test]
fn comment_follows_item_on_insert() {
    let mut seq: CommentedSeq = ["a", "b", "c"].into_iter().collect();
    set_comment(&mut seq, &1, "keep with b", CommentPosition::EndOfLine);

    insert_item(&mut seq, 1, "x");

    assert_eq!(items(&seq), vec!["a", "x", "b", "c"]);
    assert!(get_comment(&seq, &1).is_none());
    assert_eq!(
        get_comment(&seq, &2).and_then(|b| b.get(CommentPosition::EndOfLine)),
        Some("# keep with b")
    );
}

#[test]
fn edited_document_emits_comments_in_place() {
    let mut config = Node::map_from_yaml_str(
        "name: Demo\nattributes:\n  - name: A\n  - name: B\n  - name: C\n",
    )
    .unwrap();
    let attributes = config.seq_entry("attributes").unwrap();
    set_comment(attributes, &1, "second", CommentPosition::Before);
    set_comment(attributes, &2, "third", CommentPosition::EndOfLine);

    delete_item(attributes, &0, true);
    let text = emit(&Node::Map(config));

    assert_eq!(
        text,
        "name: Demo\nattributes:\n  # second\n  - name: B\n  - name: C # third\n"
    );
}
