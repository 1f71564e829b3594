//! Comment-preserving edit primitives.
//!
//! Every primitive mutates its container in place. Out-of-range indices and
//! missing keys are logged and answered with a sentinel (`false` / `None`);
//! callers validate their inputs.

use tracing::{debug, warn};

use crate::comment::{CommentBundle, CommentPosition};
use crate::node::{CommentedSeq, Container, Node};

/// Replace the value at `key`, keeping its comment bundle in place.
///
/// Returns `true` if a comment bundle was attached to `key`.
pub fn update_value<C: Container>(container: &mut C, key: &C::Key, value: impl Into<Node>) -> bool {
    if !container.put(key, value.into()) {
        warn!(key = ?key, "index out of range, cannot update");
        return false;
    }
    let had_comment = container.comment_table().contains(key);
    if had_comment {
        debug!(key = ?key, "preserved comment on updated key");
    }
    had_comment
}

/// Insert `value` at `index`, shifting every comment at `>= index` up by one.
///
/// No bundle is created at `index`. Returns `true` if any comment moved.
pub fn insert_item(seq: &mut CommentedSeq, index: usize, value: impl Into<Node>) -> bool {
    if index > seq.len() {
        warn!(index, len = seq.len(), "index out of range, cannot insert");
        return false;
    }
    seq.insert_raw(index, value.into());
    let moved = seq.comments_mut().shift_up(index);
    if moved > 0 {
        debug!(index, moved, "shifted comments after insert");
    }
    moved > 0
}

/// Remove the value at `key` and return it.
///
/// Sequence comments above the removed index slide down by one. When
/// `preserve_orphaned` is set, the removed key's own bundle is re-attached:
/// for mappings to the first remaining key, for sequences to the element
/// now occupying the vacated index (dropped if none). Either way it replaces
/// whatever bundle already sat there.
pub fn delete_item<C: Container>(
    container: &mut C,
    key: &C::Key,
    preserve_orphaned: bool,
) -> Option<Node> {
    if !container.has_key(key) {
        warn!(key = ?key, "key not found, cannot delete");
        return None;
    }

    let orphan = container.comment_table_mut().remove(key);
    if orphan.is_some() {
        debug!(key = ?key, "found comment on deleted key");
    }
    let removed = container.take(key)?;
    container.settle_comments(key, orphan.filter(|_| preserve_orphaned));
    Some(removed)
}

/// The comment bundle attached to `key`, if any.
pub fn get_comment<'a, C: Container>(container: &'a C, key: &C::Key) -> Option<&'a CommentBundle> {
    container.comment_table().get(key)
}

/// Attach `text` as a comment on `key` at `position`.
///
/// A leading `# ` is added when missing. Returns `false` if `key` is absent.
pub fn set_comment<C: Container>(
    container: &mut C,
    key: &C::Key,
    text: &str,
    position: CommentPosition,
) -> bool {
    if !container.has_key(key) {
        warn!(key = ?key, "key not found, cannot set comment");
        return false;
    }
    let text = if text.trim_start().starts_with('#') {
        text.to_string()
    } else {
        format!("# {text}")
    };
    container
        .comment_table_mut()
        .entry(key.clone())
        .set(position, text);
    debug!(key = ?key, ?position, "set comment");
    true
}

pub fn has_comment<C: Container>(container: &C, key: &C::Key) -> bool {
    get_comment(container, key).is_some()
}

/// Copy bundles from `source` to `target` for keys present in both.
///
/// With `keys == None` every key carrying a comment in `source` is tried.
/// Returns the number of bundles copied.
pub fn copy_comments<C: Container>(source: &C, target: &mut C, keys: Option<&[C::Key]>) -> usize {
    let candidates: Vec<C::Key> = match keys {
        Some(keys) => keys.to_vec(),
        None => source.comment_table().keys().cloned().collect(),
    };

    let mut copied = 0;
    for key in candidates {
        let Some(bundle) = source.comment_table().get(&key) else {
            continue;
        };
        if !target.has_key(&key) {
            continue;
        }
        target.comment_table_mut().insert(key.clone(), bundle.clone());
        debug!(key = ?key, "copied comment");
        copied += 1;
    }
    copied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::CommentedMap;
    use proptest::prelude::*;

    fn seq_of(items: &[&str]) -> CommentedSeq {
        items.iter().copied().collect()
    }

    fn eol_text<C: Container>(c: &C, key: &C::Key) -> Option<String> {
        get_comment(c, key)
            .and_then(|b| b.get(CommentPosition::EndOfLine))
            .map(str::to_string)
    }

    fn names(seq: &CommentedSeq) -> Vec<&str> {
        seq.iter().filter_map(Node::as_str).collect()
    }

    #[test]
    fn update_keeps_comment() {
        let mut map: CommentedMap = [("name", "Old"), ("kind", "x")].into_iter().collect();
        assert!(set_comment(&mut map, &"name".to_string(), "keep me", CommentPosition::EndOfLine));
        assert!(update_value(&mut map, &"name".to_string(), "New"));
        assert_eq!(map.get_str("name"), Some("New"));
        assert_eq!(eol_text(&map, &"name".to_string()).as_deref(), Some("# keep me"));
        assert!(!update_value(&mut map, &"kind".to_string(), "y"));
    }

    #[test]
    fn update_out_of_range_index_is_refused() {
        let mut seq = seq_of(&["a"]);
        assert!(!update_value(&mut seq, &5, "z"));
        assert_eq!(names(&seq), vec!["a"]);
    }

    #[test]
    fn insert_shifts_comments() {
        let mut seq = seq_of(&["a", "b", "c"]);
        set_comment(&mut seq, &1, "on b", CommentPosition::EndOfLine);
        assert!(insert_item(&mut seq, 1, "x"));
        assert_eq!(names(&seq), vec!["a", "x", "b", "c"]);
        assert!(!has_comment(&seq, &1));
        assert_eq!(eol_text(&seq, &2).as_deref(), Some("# on b"));
    }

    #[test]
    fn insert_below_comment_leaves_it_alone() {
        let mut seq = seq_of(&["a", "b"]);
        set_comment(&mut seq, &0, "first", CommentPosition::Before);
        assert!(!insert_item(&mut seq, 2, "c"));
        assert!(has_comment(&seq, &0));
        assert!(!insert_item(&mut seq, 10, "z"));
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn delete_from_sequence_reattaches_orphan() {
        let mut seq = seq_of(&["a", "b", "c"]);
        set_comment(&mut seq, &1, "on b", CommentPosition::EndOfLine);
        let removed = delete_item(&mut seq, &1, true);
        assert_eq!(removed.as_ref().and_then(Node::as_str), Some("b"));
        assert_eq!(names(&seq), vec!["a", "c"]);
        assert_eq!(eol_text(&seq, &1).as_deref(), Some("# on b"));
    }

    #[test]
    fn delete_last_drops_orphan() {
        let mut seq = seq_of(&["a", "b"]);
        set_comment(&mut seq, &1, "on b", CommentPosition::EndOfLine);
        delete_item(&mut seq, &1, true);
        assert!(seq.comments().is_empty());
    }

    #[test]
    fn delete_shifts_following_comments() {
        let mut seq = seq_of(&["a", "b", "c", "d"]);
        set_comment(&mut seq, &3, "on d", CommentPosition::EndOfLine);
        delete_item(&mut seq, &0, false);
        assert_eq!(eol_text(&seq, &2).as_deref(), Some("# on d"));
    }

    #[test]
    fn delete_without_preserve_discards_orphan() {
        let mut seq = seq_of(&["a", "b", "c"]);
        set_comment(&mut seq, &1, "on b", CommentPosition::EndOfLine);
        delete_item(&mut seq, &1, false);
        assert!(seq.comments().is_empty());
    }

    #[test]
    fn delete_from_mapping_overwrites_first_key_bundle() {
        let mut map: CommentedMap = [("a", 1i64), ("b", 2i64), ("c", 3i64)].into_iter().collect();
        set_comment(&mut map, &"a".to_string(), "on a", CommentPosition::EndOfLine);
        set_comment(&mut map, &"c".to_string(), "on c", CommentPosition::EndOfLine);
        delete_item(&mut map, &"c".to_string(), true);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(eol_text(&map, &"a".to_string()).as_deref(), Some("# on c"));
    }

    #[test]
    fn delete_missing_key_is_sentinel() {
        let mut map: CommentedMap = [("a", 1i64)].into_iter().collect();
        assert!(delete_item(&mut map, &"zzz".to_string(), true).is_none());
        let mut seq = seq_of(&["a"]);
        assert!(delete_item(&mut seq, &3, true).is_none());
    }

    #[test]
    fn set_comment_on_missing_key_fails() {
        let mut map = CommentedMap::new();
        assert!(!set_comment(&mut map, &"nope".to_string(), "x", CommentPosition::Before));
    }

    #[test]
    fn set_comment_keeps_existing_hash() {
        let mut seq = seq_of(&["a"]);
        set_comment(&mut seq, &0, "#already", CommentPosition::Before);
        assert_eq!(
            get_comment(&seq, &0).and_then(|b| b.get(CommentPosition::Before)),
            Some("#already")
        );
    }

    #[test]
    fn copy_only_shared_keys() {
        let mut source: CommentedMap = [("a", 1i64), ("b", 2i64)].into_iter().collect();
        set_comment(&mut source, &"a".to_string(), "on a", CommentPosition::EndOfLine);
        set_comment(&mut source, &"b".to_string(), "on b", CommentPosition::EndOfLine);
        let mut target: CommentedMap = [("a", 9i64)].into_iter().collect();

        assert_eq!(copy_comments(&source, &mut target, None), 1);
        assert!(has_comment(&target, &"a".to_string()));
        assert!(!has_comment(&target, &"b".to_string()));

        let mut other: CommentedMap = [("a", 0i64), ("b", 0i64)].into_iter().collect();
        assert_eq!(
            copy_comments(&source, &mut other, Some(&["b".to_string(), "x".to_string()])),
            1
        );
    }

    proptest! {
        #[test]
        fn insert_then_delete_restores(
            len in 0usize..8,
            commented in proptest::collection::btree_set(0usize..8, 0..8),
            at in 0usize..9,
        ) {
            let items: Vec<String> = (0..len).map(|i| format!("item{i}")).collect();
            let mut seq: CommentedSeq = items.iter().map(String::as_str).collect();
            for i in commented.iter().filter(|i| **i < len) {
                set_comment(&mut seq, i, &format!("c{i}"), CommentPosition::EndOfLine);
            }
            let original = seq.clone();
            let at = at.min(len);

            insert_item(&mut seq, at, "new");
            delete_item(&mut seq, &at, true);
            prop_assert_eq!(seq, original);
        }

        #[test]
        fn insert_shift_law(
            len in 1usize..8,
            commented in proptest::collection::btree_set(0usize..8, 0..8),
            at in 0usize..8,
        ) {
            let items: Vec<String> = (0..len).map(|i| format!("item{i}")).collect();
            let mut seq: CommentedSeq = items.iter().map(String::as_str).collect();
            let commented: Vec<usize> = commented.into_iter().filter(|i| *i < len).collect();
            for i in &commented {
                set_comment(&mut seq, i, &format!("c{i}"), CommentPosition::EndOfLine);
            }
            let at = at.min(len);
            insert_item(&mut seq, at, "new");

            for i in &commented {
                let expected = if *i >= at { i + 1 } else { *i };
                let expected_text = format!("# c{i}");
                prop_assert_eq!(eol_text(&seq, &expected), Some(expected_text));
            }
            prop_assert_eq!(seq.comments().len(), commented.len());
        }
    }
}
