//! Arena-backed form-element tree.
//!
//! Nodes live in one contiguous `Vec` and refer to each other by
//! [`NodeId`]. A node owns its ordered `children` list; `parent` is a plain
//! back-reference used for traversal only.
//!
//! # Invariants
//!
//! - `path` of every node is `forms[F].elements[i]` for roots and
//!   `<parent path>.child_items[j]` below, where `i`/`j` is the node's
//!   position among the accepted siblings.
//! - Only container-typed nodes have children.
//! - Names are expected to be unique per form; lookups by name return the
//!   first match in depth-first order, [`ElementTree::flatten`] keeps the
//!   last. Both go through a name index kept in step with construction.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Range;

use procsync_types::{ElementPath, Segment};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ExtractorConfig;
use crate::error::{FormError, FormResult};

/// Index of a node in its [`ElementTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One element of a form tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementNode {
    pub id: NodeId,
    pub name: String,
    /// Local XML tag name, e.g. `UsualGroup` or `InputField`.
    pub element_type: String,
    pub depth: usize,
    /// Position among accepted siblings.
    pub index: usize,
    pub path: ElementPath,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Byte range of the source XML element, when extracted from XML.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Range<usize>>,
}

impl ElementNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// The element tree of a single form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementTree {
    form_index: usize,
    config: ExtractorConfig,
    nodes: Vec<ElementNode>,
    roots: Vec<NodeId>,
    by_name: HashMap<String, Vec<NodeId>>,
}

impl ElementTree {
    /// An empty tree for form `form_index` with the default container set.
    pub fn new(form_index: usize) -> Self {
        Self::with_config(form_index, ExtractorConfig::default())
    }

    pub fn with_config(form_index: usize, config: ExtractorConfig) -> Self {
        Self {
            form_index,
            config,
            nodes: Vec::new(),
            roots: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn form_index(&self) -> usize {
        self.form_index
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ---------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------

    /// Append a top-level element.
    pub fn add_root(&mut self, name: &str, element_type: &str) -> NodeId {
        self.attach(None, name, element_type, None)
    }

    /// Append a child under `parent`.
    ///
    /// Fails if `parent` is unknown or its type is not a container type.
    pub fn add_child(&mut self, parent: NodeId, name: &str, element_type: &str) -> FormResult<NodeId> {
        let owner = self.node(parent).ok_or(FormError::NodeNotFound(parent))?;
        if !self.config.is_container(&owner.element_type) {
            return Err(FormError::NotAContainer {
                name: owner.name.clone(),
                element_type: owner.element_type.clone(),
            });
        }
        Ok(self.attach(Some(parent), name, element_type, None))
    }

    /// Push a node without checking the parent's type. `parent` must exist.
    pub(crate) fn attach(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        element_type: &str,
        source: Option<Range<usize>>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let (depth, index, path) = match parent.and_then(|p| self.nodes.get(p.0)) {
            Some(owner) => {
                let index = owner.children.len();
                (owner.depth + 1, index, owner.path.child(index))
            }
            None => {
                let index = self.roots.len();
                (0, index, ElementPath::root(self.form_index, index))
            }
        };

        let same_name = self.by_name.entry(name.to_string()).or_default();
        if !same_name.is_empty() {
            warn!(name, %path, "duplicate element name in form");
        }
        same_name.push(id);
        debug!(name, element_type, %path, "added element");

        self.nodes.push(ElementNode {
            id,
            name: name.to_string(),
            element_type: element_type.to_string(),
            depth,
            index,
            path,
            parent,
            children: Vec::new(),
            source,
        });
        match parent.and_then(|p| self.nodes.get_mut(p.0)) {
            Some(owner) => owner.children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    // ---------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&ElementNode> {
        self.nodes.get(id.0)
    }

    /// Top-level nodes in document order.
    pub fn roots(&self) -> impl Iterator<Item = &ElementNode> + '_ {
        self.roots.iter().filter_map(|id| self.node(*id))
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &ElementNode> + '_ {
        self.node(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.node(*child))
    }

    pub fn parent(&self, id: NodeId) -> Option<&ElementNode> {
        self.node(id)?.parent.and_then(|p| self.node(p))
    }

    /// Name of the node's parent, `None` for roots.
    pub fn parent_name(&self, id: NodeId) -> Option<&str> {
        self.parent(id).map(|p| p.name.as_str())
    }

    /// Ancestors from the root down to the direct parent.
    pub fn ancestors(&self, id: NodeId) -> Vec<&ElementNode> {
        let mut chain = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            chain.push(node);
            current = node.parent.and_then(|p| self.node(p));
        }
        chain.reverse();
        chain
    }

    /// All nodes sharing the node's container, itself included.
    pub fn siblings(&self, id: NodeId) -> Vec<&ElementNode> {
        match self.node(id).map(|n| n.parent) {
            Some(Some(parent)) => self.children(parent).collect(),
            Some(None) => self.roots().collect(),
            None => Vec::new(),
        }
    }

    /// Direct child of `id` named `name`.
    pub fn find_child(&self, id: NodeId, name: &str) -> Option<&ElementNode> {
        self.children(id).find(|child| child.name == name)
    }

    /// Every node in depth-first pre-order.
    pub fn iter(&self) -> Vec<&ElementNode> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.node(id) {
                out.push(node);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Every node named `name`, in insertion order.
    fn named(&self, name: &str) -> impl Iterator<Item = &ElementNode> + '_ {
        self.by_name
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.node(*id))
    }

    /// First node named `name` in depth-first order.
    ///
    /// Paths order the same way as a pre-order walk, so the smallest path
    /// among the same-named nodes is the first one visited.
    pub fn find(&self, name: &str) -> Option<&ElementNode> {
        self.named(name).min_by(|a, b| a.path.cmp(&b.path))
    }

    /// Path of the first node named `name`.
    pub fn find_element_path(&self, name: &str) -> Option<&ElementPath> {
        self.find(name).map(|node| &node.path)
    }

    /// The node addressed by `path`, if it belongs to this tree.
    pub fn node_at(&self, path: &ElementPath) -> Option<&ElementNode> {
        if path.form_index() != self.form_index {
            return None;
        }
        let (first, rest) = path.segments().split_first()?;
        let Segment::Elements(index) = first else {
            return None;
        };
        let mut current = self.node(*self.roots.get(*index)?)?;
        for segment in rest {
            let Segment::ChildItems(index) = segment else {
                return None;
            };
            current = self.node(*current.children.get(*index)?)?;
        }
        Some(current)
    }

    /// Name to node map over the whole tree. Duplicate names keep the last
    /// node in depth-first order.
    pub fn flatten(&self) -> BTreeMap<&str, &ElementNode> {
        let mut flat = BTreeMap::new();
        for name in self.by_name.keys() {
            let mut nodes: Vec<&ElementNode> = self.named(name).collect();
            nodes.sort_by(|a, b| a.path.cmp(&b.path));
            for pair in nodes.windows(2) {
                warn!(name = %name, first = %pair[0].path, second = %pair[1].path, "duplicate element name, keeping the later one");
            }
            if let Some(last) = nodes.last() {
                flat.insert(name.as_str(), *last);
            }
        }
        flat
    }

    /// Whether `node` has a type that may hold children.
    pub fn is_container(&self, node: &ElementNode) -> bool {
        self.config.is_container(&node.element_type)
    }
}
