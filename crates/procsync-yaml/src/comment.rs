//! Comment bundles and the per-container side-table that holds them.
//!
//! The edit primitives treat a [`CommentBundle`] as opaque: they only move
//! bundles between keys or indices. Only the emitter looks inside.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a comment sits relative to the key it is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentPosition {
    /// Trailing the value on the same line.
    EndOfLine,
    /// On its own line(s) above the key.
    Before,
}

/// The comments attached to one child of a container.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_of_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    after: Option<String>,
}

impl CommentBundle {
    /// A bundle holding a single comment at `position`.
    pub fn with(position: CommentPosition, text: impl Into<String>) -> Self {
        let mut bundle = Self::default();
        bundle.set(position, text);
        bundle
    }

    /// Replace the comment at `position`.
    pub fn set(&mut self, position: CommentPosition, text: impl Into<String>) {
        let text = Some(text.into());
        match position {
            CommentPosition::EndOfLine => self.end_of_line = text,
            CommentPosition::Before => self.before = text,
        }
    }

    pub fn get(&self, position: CommentPosition) -> Option<&str> {
        match position {
            CommentPosition::EndOfLine => self.end_of_line.as_deref(),
            CommentPosition::Before => self.before.as_deref(),
        }
    }

    /// Comment lines following the entry (kept verbatim on round trips).
    pub fn after(&self) -> Option<&str> {
        self.after.as_deref()
    }

    pub fn set_after(&mut self, text: impl Into<String>) {
        self.after = Some(text.into());
    }

    pub fn is_empty(&self) -> bool {
        self.before.is_none() && self.end_of_line.is_none() && self.after.is_none()
    }
}

/// Side-table of comment bundles keyed by child key or index.
#[derive(Clone, PartialEq, Eq)]
pub struct CommentTable<K: Ord> {
    entries: BTreeMap<K, CommentBundle>,
}

impl<K: Ord> Default for CommentTable<K> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord + fmt::Debug> fmt::Debug for CommentTable<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<K: Ord + Clone> CommentTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&CommentBundle> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut CommentBundle> {
        self.entries.get_mut(key)
    }

    /// The bundle at `key`, created empty if absent.
    pub fn entry(&mut self, key: K) -> &mut CommentBundle {
        self.entries.entry(key).or_default()
    }

    /// Attach `bundle` at `key`, returning any bundle it replaced.
    pub fn insert(&mut self, key: K, bundle: CommentBundle) -> Option<CommentBundle> {
        self.entries.insert(key, bundle)
    }

    pub fn remove(&mut self, key: &K) -> Option<CommentBundle> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &CommentBundle)> {
        self.entries.iter()
    }

    /// Move the bundle at `from` to `to`, overwriting whatever sits at `to`.
    ///
    /// Returns `false` when there is nothing at `from`.
    pub fn move_entry(&mut self, from: &K, to: K) -> bool {
        match self.entries.remove(from) {
            Some(bundle) => {
                self.entries.insert(to, bundle);
                true
            }
            None => false,
        }
    }
}

impl CommentTable<usize> {
    /// Move every bundle at index `>= from` up by one.
    ///
    /// Returns the number of bundles moved.
    pub fn shift_up(&mut self, from: usize) -> usize {
        let tail = self.entries.split_off(&from);
        let moved = tail.len();
        self.entries
            .extend(tail.into_iter().map(|(index, bundle)| (index + 1, bundle)));
        moved
    }

    /// Move every bundle at index `> above` down by one.
    ///
    /// A bundle still sitting at `above` is overwritten by its successor.
    pub fn shift_down(&mut self, above: usize) -> usize {
        let tail = self.entries.split_off(&(above + 1));
        let moved = tail.len();
        self.entries
            .extend(tail.into_iter().map(|(index, bundle)| (index - 1, bundle)));
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eol(text: &str) -> CommentBundle {
        CommentBundle::with(CommentPosition::EndOfLine, text)
    }

    #[test]
    fn bundle_positions() {
        let mut bundle = eol("# trailing");
        bundle.set(CommentPosition::Before, "# header");
        assert_eq!(bundle.get(CommentPosition::EndOfLine), Some("# trailing"));
        assert_eq!(bundle.get(CommentPosition::Before), Some("# header"));
        assert!(bundle.after().is_none());
        assert!(!bundle.is_empty());
        assert!(CommentBundle::default().is_empty());
    }

    #[test]
    fn move_entry_overwrites_target() {
        let mut table = CommentTable::new();
        table.insert("a".to_string(), eol("one"));
        table.insert("b".to_string(), eol("two"));
        assert!(table.move_entry(&"a".to_string(), "b".to_string()));
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get(&"b".to_string()).and_then(|b| b.get(CommentPosition::EndOfLine)),
            Some("one")
        );
        assert!(!table.move_entry(&"missing".to_string(), "b".to_string()));
    }

    #[test]
    fn shift_up_moves_indices_at_or_above() {
        let mut table = CommentTable::new();
        table.insert(0, eol("zero"));
        table.insert(2, eol("two"));
        table.insert(3, eol("three"));
        assert_eq!(table.shift_up(2), 2);
        assert_eq!(table.keys().copied().collect::<Vec<_>>(), vec![0, 3, 4]);
    }

    #[test]
    fn shift_down_moves_indices_above() {
        let mut table = CommentTable::new();
        table.insert(0, eol("zero"));
        table.insert(2, eol("two"));
        table.insert(5, eol("five"));
        assert_eq!(table.shift_down(1), 2);
        assert_eq!(table.keys().copied().collect::<Vec<_>>(), vec![0, 1, 4]);
    }

    #[test]
    fn bundle_serde_roundtrip() {
        let mut bundle = eol("# note");
        bundle.set_after("# tail");
        let json = serde_json::to_string(&bundle).unwrap();
        assert!(!json.contains("before"));
        let back: CommentBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bundle);
    }
}
