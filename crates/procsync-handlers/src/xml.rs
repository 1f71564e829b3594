//! Namespace-aware lookups over `roxmltree` nodes.
//!
//! Handlers address metadata with short relative paths such as
//! `.//Properties/Name` in the metadata namespace. [`Tag`] pairs a local
//! name with its namespace, and the helpers here walk descendants and
//! children the way those paths read.

use procsync_types::namespace::{CORE, FORM, META};
use procsync_types::{Lang, MultilangText};
use roxmltree::Node;

/// A namespaced element name. `namespace: None` matches any namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tag {
    pub namespace: Option<&'static str>,
    pub local: &'static str,
}

impl Tag {
    pub const fn meta(local: &'static str) -> Self {
        Self { namespace: Some(META), local }
    }

    pub const fn core(local: &'static str) -> Self {
        Self { namespace: Some(CORE), local }
    }

    pub const fn form(local: &'static str) -> Self {
        Self { namespace: Some(FORM), local }
    }

    /// Match on the local name only.
    pub const fn any(local: &'static str) -> Self {
        Self { namespace: None, local }
    }

    pub fn matches(&self, node: &Node<'_, '_>) -> bool {
        node.is_element()
            && node.tag_name().name() == self.local
            && self
                .namespace
                .map_or(true, |ns| node.tag_name().namespace() == Some(ns))
    }
}

/// Descendants of `node` (not `node` itself) matching `tag`, in document order.
pub fn descendants<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: Tag,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.descendants().skip(1).filter(move |n| tag.matches(n))
}

/// Direct children of `node` matching `tag`.
pub fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: Tag,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |n| tag.matches(n))
}

/// First match of the relative path `.//steps[0]/steps[1]/...`.
pub fn find_path<'a, 'input: 'a>(node: Node<'a, 'input>, steps: &[Tag]) -> Option<Node<'a, 'input>> {
    let (first, rest) = steps.split_first()?;
    descendants(node, *first).find_map(|start| {
        rest.iter()
            .try_fold(start, |current, step| children(current, *step).next())
    })
}

/// Trimmed, non-empty text of `node`.
pub fn text<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.text().map(str::trim).filter(|t| !t.is_empty())
}

/// Text at the relative path `steps`.
pub fn text_at<'a>(node: Node<'a, '_>, steps: &[Tag]) -> Option<&'a str> {
    find_path(node, steps).and_then(text)
}

/// Whether `node` sits somewhere below an element matching `tag`.
pub fn has_ancestor(node: Node<'_, '_>, tag: Tag) -> bool {
    node.ancestors().skip(1).any(|n| tag.matches(&n))
}

/// Language bag of the first descendant named `property` (any namespace).
pub fn multilang(node: Node<'_, '_>, property: &'static str) -> MultilangText {
    descendants(node, Tag::any(property))
        .next()
        .map(read_multilang)
        .unwrap_or_default()
}

/// Language bag of a property element.
///
/// `<v8:item><v8:lang>/<v8:content>` pairs fill the bag; unknown languages
/// are dropped. A property with plain text and no items is read as Russian.
pub fn read_multilang(prop: Node<'_, '_>) -> MultilangText {
    let mut items = descendants(prop, Tag::core("item")).peekable();
    if items.peek().is_none() {
        return text(prop)
            .map(|t| MultilangText::single(Lang::Ru, t))
            .unwrap_or_default();
    }

    let mut bag = MultilangText::new();
    for item in items {
        let lang = children(item, Tag::core("lang")).next().and_then(text);
        let content = children(item, Tag::core("content")).next();
        if let (Some(lang), Some(content)) = (lang.and_then(Lang::from_code), content) {
            bag.insert(lang, content.text().unwrap_or_default());
        }
    }
    bag
}

/// Location of `node` as `/Root/Child[2]/Leaf`, indexing only tags that
/// repeat among their siblings.
pub fn location(node: Node<'_, '_>) -> String {
    let mut parts: Vec<String> = node
        .ancestors()
        .filter(Node::is_element)
        .map(|current| {
            let local = current.tag_name().name();
            let same: Vec<Node> = current
                .parent_element()
                .map(|parent| {
                    parent
                        .children()
                        .filter(|c| c.is_element() && c.tag_name() == current.tag_name())
                        .collect()
                })
                .unwrap_or_default();
            match same.iter().position(|c| *c == current) {
                Some(i) if same.len() > 1 => format!("{local}[{}]", i + 1),
                _ => local.to_string(),
            }
        })
        .collect();
    parts.reverse();
    format!("/{}", parts.join("/"))
}
