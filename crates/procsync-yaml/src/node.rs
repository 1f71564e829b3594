//! The document model: ordered mappings and sequences with comment tables.

use serde_yaml::{Mapping, Value};

use crate::comment::CommentTable;
use crate::error::{Result, YamlError};

/// A document node.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Any non-collection YAML value (string, number, bool, null).
    Scalar(Value),
    Map(CommentedMap),
    Seq(CommentedSeq),
}

impl Node {
    /// Parse YAML text into a node tree.
    ///
    /// Comments in the text are not recovered; they are attached through the
    /// comment tables by whatever loader owns the round trip.
    pub fn from_yaml_str(text: &str) -> Result<Node> {
        let value: Value = serde_yaml::from_str(text)?;
        Ok(Node::from(value))
    }

    /// Parse YAML text whose root must be a mapping (a processor config).
    pub fn map_from_yaml_str(text: &str) -> Result<CommentedMap> {
        match Self::from_yaml_str(text)? {
            Node::Map(map) => Ok(map),
            other => Err(YamlError::NotAMapping {
                found: other.kind(),
            }),
        }
    }

    /// Convert back to a plain value, dropping comments.
    pub fn to_value(&self) -> Value {
        match self {
            Node::Scalar(value) => value.clone(),
            Node::Map(map) => Value::Mapping(
                map.iter()
                    .map(|(k, v)| (Value::String(k.to_string()), v.to_value()))
                    .collect(),
            ),
            Node::Seq(seq) => Value::Sequence(seq.iter().map(Node::to_value).collect()),
        }
    }

    pub fn null() -> Self {
        Node::Scalar(Value::Null)
    }

    /// Short name of the node kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Scalar(_) => "scalar",
            Node::Map(_) => "mapping",
            Node::Seq(_) => "sequence",
        }
    }

    pub fn as_map(&self) -> Option<&CommentedMap> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut CommentedMap> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&CommentedSeq> {
        match self {
            Node::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_seq_mut(&mut self) -> Option<&mut CommentedSeq> {
        match self {
            Node::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    /// The string content of a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Scalar(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Mapping(mapping) => Node::Map(CommentedMap::from(mapping)),
            Value::Sequence(items) => Node::Seq(items.into_iter().map(Node::from).collect()),
            Value::Tagged(tagged) => Node::from(tagged.value),
            scalar => Node::Scalar(scalar),
        }
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Scalar(Value::String(s.to_string()))
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Scalar(Value::String(s))
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Scalar(Value::Number(n.into()))
    }
}

impl From<u32> for Node {
    fn from(n: u32) -> Self {
        Node::Scalar(Value::Number(n.into()))
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Scalar(Value::Bool(b))
    }
}

impl From<CommentedMap> for Node {
    fn from(map: CommentedMap) -> Self {
        Node::Map(map)
    }
}

impl From<CommentedSeq> for Node {
    fn from(seq: CommentedSeq) -> Self {
        Node::Seq(seq)
    }
}

/// Render a mapping key as the string the document is keyed by.
fn key_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// CommentedMap
// ---------------------------------------------------------------------------

/// An insertion-ordered mapping with comments keyed by entry key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommentedMap {
    entries: Vec<(String, Node)>,
    comments: CommentTable<String>,
}

impl CommentedMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        let i = self.position(key)?;
        Some(&mut self.entries[i].1)
    }

    /// Convenience accessor for string-valued entries.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Node::as_str)
    }

    /// Set `key`, replacing in place or appending; returns the old value.
    ///
    /// Comments attached to `key` are untouched.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Node>) -> Option<Node> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove `key` without touching the comment table.
    pub(crate) fn remove_raw(&mut self, key: &str) -> Option<Node> {
        let i = self.position(key)?;
        Some(self.entries.remove(i).1)
    }

    /// The sequence stored under `key`, created empty if the key is absent.
    ///
    /// Returns `None` if `key` holds something other than a sequence.
    pub fn seq_entry(&mut self, key: &str) -> Option<&mut CommentedSeq> {
        if !self.contains_key(key) {
            self.entries
                .push((key.to_string(), Node::Seq(CommentedSeq::new())));
        }
        self.get_mut(key).and_then(Node::as_seq_mut)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn first_key(&self) -> Option<&str> {
        self.entries.first().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn comments(&self) -> &CommentTable<String> {
        &self.comments
    }

    pub fn comments_mut(&mut self) -> &mut CommentTable<String> {
        &mut self.comments
    }
}

impl From<Mapping> for CommentedMap {
    fn from(mapping: Mapping) -> Self {
        let entries = mapping
            .into_iter()
            .map(|(k, v)| (key_string(&k), Node::from(v)))
            .collect();
        Self {
            entries,
            comments: CommentTable::new(),
        }
    }
}

impl<K: Into<String>, V: Into<Node>> FromIterator<(K, V)> for CommentedMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = CommentedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

// ---------------------------------------------------------------------------
// CommentedSeq
// ---------------------------------------------------------------------------

/// A sequence with comments keyed by item index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommentedSeq {
    items: Vec<Node>,
    comments: CommentTable<usize>,
}

impl CommentedSeq {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.items.get_mut(index)
    }

    /// Append at the end; no existing comment moves.
    pub fn push(&mut self, value: impl Into<Node>) {
        self.items.push(value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.items.iter()
    }

    /// Index of the first mapping item whose `name` entry equals `name`.
    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.as_map().and_then(|m| m.get_str("name")) == Some(name))
    }

    pub(crate) fn insert_raw(&mut self, index: usize, value: Node) {
        self.items.insert(index, value);
    }

    pub(crate) fn remove_raw(&mut self, index: usize) -> Option<Node> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn comments(&self) -> &CommentTable<usize> {
        &self.comments
    }

    pub fn comments_mut(&mut self) -> &mut CommentTable<usize> {
        &mut self.comments
    }
}

impl<V: Into<Node>> FromIterator<V> for CommentedSeq {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
            comments: CommentTable::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

/// Keyed access shared by mappings (string keys) and sequences (indices).
///
/// The edit primitives in [`crate::ops`] are generic over this trait; the
/// per-container hooks decide how comments follow an edit.
pub trait Container {
    type Key: Clone + Ord + std::fmt::Debug;

    fn comment_table(&self) -> &CommentTable<Self::Key>;

    fn comment_table_mut(&mut self) -> &mut CommentTable<Self::Key>;

    fn has_key(&self, key: &Self::Key) -> bool;

    /// Store `value` at `key`. Sequences refuse out-of-range indices.
    fn put(&mut self, key: &Self::Key, value: Node) -> bool;

    /// Remove the value at `key` without touching comments.
    fn take(&mut self, key: &Self::Key) -> Option<Node>;

    /// Re-home comments after `removed` was taken out.
    ///
    /// `orphan` is the bundle that was attached to the removed key, if it
    /// should be preserved.
    fn settle_comments(&mut self, removed: &Self::Key, orphan: Option<crate::CommentBundle>);
}

impl Container for CommentedMap {
    type Key = String;

    fn comment_table(&self) -> &CommentTable<String> {
        &self.comments
    }

    fn comment_table_mut(&mut self) -> &mut CommentTable<String> {
        &mut self.comments
    }

    fn has_key(&self, key: &String) -> bool {
        self.contains_key(key)
    }

    fn put(&mut self, key: &String, value: Node) -> bool {
        self.insert(key.clone(), value);
        true
    }

    fn take(&mut self, key: &String) -> Option<Node> {
        self.remove_raw(key)
    }

    fn settle_comments(&mut self, _removed: &String, orphan: Option<crate::CommentBundle>) {
        // The orphan replaces any bundle already on the first remaining key.
        if let (Some(bundle), Some(first)) = (orphan, self.first_key().map(str::to_string)) {
            tracing::debug!(key = %first, "re-attaching orphaned comment");
            self.comments.insert(first, bundle);
        }
    }
}

impl Container for CommentedSeq {
    type Key = usize;

    fn comment_table(&self) -> &CommentTable<usize> {
        &self.comments
    }

    fn comment_table_mut(&mut self) -> &mut CommentTable<usize> {
        &mut self.comments
    }

    fn has_key(&self, key: &usize) -> bool {
        *key < self.items.len()
    }

    fn put(&mut self, key: &usize, value: Node) -> bool {
        match self.items.get_mut(*key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn take(&mut self, key: &usize) -> Option<Node> {
        self.remove_raw(*key)
    }

    fn settle_comments(&mut self, removed: &usize, orphan: Option<crate::CommentBundle>) {
        self.comments.shift_down(*removed);
        // The orphan lands on the element that slid into the vacated slot.
        if let Some(bundle) = orphan {
            if *removed < self.items.len() {
                tracing::debug!(index = *removed, "re-attaching orphaned comment");
                self.comments.insert(*removed, bundle);
            }
        }
    }
}
