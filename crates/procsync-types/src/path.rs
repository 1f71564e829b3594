//! Element and container paths.
//!
//! Every node of a form-element tree is addressed by a dotted selector:
//!
//! ```text
//! path    := "forms[" uint "]." segment ("." segment)*
//! segment := ("elements" | "child_items") "[" uint "]"
//! ```
//!
//! Root nodes live at `forms[F].elements[i]`; descendants append
//! `.child_items[j]`. A [`ContainerPath`] names the sequence a node lives in
//! (the same selector without the trailing index) and is what the insertion
//! planner hands back.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PathError;

const ELEMENTS: &str = "elements";
const CHILD_ITEMS: &str = "child_items";

/// One indexed step of an [`ElementPath`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// `elements[i]`, the top-level sequence of a form.
    Elements(usize),
    /// `child_items[j]`, the children of a container element.
    ChildItems(usize),
}

impl Segment {
    /// The index carried by this segment.
    pub fn index(&self) -> usize {
        match self {
            Self::Elements(i) | Self::ChildItems(i) => *i,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Elements(i) => write!(f, "{ELEMENTS}[{i}]"),
            Self::ChildItems(i) => write!(f, "{CHILD_ITEMS}[{i}]"),
        }
    }
}

/// Dotted selector uniquely identifying one element of a form tree.
///
/// Always holds at least one segment. Serialized as its display string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ElementPath {
    form: usize,
    segments: Vec<Segment>,
}

impl ElementPath {
    /// Path of the root element at `index` of form `form`.
    pub fn root(form: usize, index: usize) -> Self {
        Self {
            form,
            segments: vec![Segment::Elements(index)],
        }
    }

    /// Path of this element's child at `index`.
    pub fn child(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::ChildItems(index));
        Self {
            form: self.form,
            segments,
        }
    }

    /// The form index `F` of `forms[F]`.
    pub fn form_index(&self) -> usize {
        self.form
    }

    /// The indexed steps after the form prefix.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Zero-based depth: 0 for roots.
    pub fn depth(&self) -> usize {
        self.segments.len() - 1
    }

    /// Position of the element among its siblings.
    pub fn index(&self) -> usize {
        self.segments.last().map(Segment::index).unwrap_or_default()
    }

    /// Path of the enclosing element, or `None` for roots.
    pub fn parent(&self) -> Option<ElementPath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            form: self.form,
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// The sequence this element lives in.
    pub fn container(&self) -> ContainerPath {
        match self.parent() {
            Some(parent) => ContainerPath::children_of(parent),
            None => ContainerPath::top_level(self.form),
        }
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "forms[{}]", self.form)?;
        for segment in &self.segments {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for ElementPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (form, rest) = split_form_prefix(s)?;
        if rest.is_empty() {
            return Err(PathError::NotAnElement(s.to_string()));
        }

        let mut segments = Vec::with_capacity(rest.len());
        for part in rest {
            match parse_indexed(part) {
                Some((ELEMENTS, i)) => segments.push(Segment::Elements(i)),
                Some((CHILD_ITEMS, i)) => segments.push(Segment::ChildItems(i)),
                _ if part == ELEMENTS || part == CHILD_ITEMS => {
                    return Err(PathError::NotAnElement(s.to_string()));
                }
                _ => {
                    return Err(PathError::InvalidSegment {
                        path: s.to_string(),
                        segment: part.to_string(),
                    });
                }
            }
        }

        Ok(Self { form, segments })
    }
}

impl TryFrom<String> for ElementPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ElementPath> for String {
    fn from(path: ElementPath) -> Self {
        path.to_string()
    }
}

/// The sequence that holds a set of sibling elements.
///
/// Displays as `forms[F].elements` for the top level of a form and as
/// `<owner>.child_items` for the children of a container element.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContainerPath {
    form: usize,
    owner: Option<ElementPath>,
}

impl ContainerPath {
    /// The top-level element sequence of form `form`.
    pub fn top_level(form: usize) -> Self {
        Self { form, owner: None }
    }

    /// The `child_items` sequence of the element at `owner`.
    pub fn children_of(owner: ElementPath) -> Self {
        Self {
            form: owner.form_index(),
            owner: Some(owner),
        }
    }

    pub fn form_index(&self) -> usize {
        self.form
    }

    /// The element owning this sequence, `None` at the top level.
    pub fn owner(&self) -> Option<&ElementPath> {
        self.owner.as_ref()
    }

    /// Path of the element that would sit at `index` in this sequence.
    pub fn element(&self, index: usize) -> ElementPath {
        match &self.owner {
            Some(owner) => owner.child(index),
            None => ElementPath::root(self.form, index),
        }
    }
}

impl fmt::Display for ContainerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "{owner}.{CHILD_ITEMS}"),
            None => write!(f, "forms[{}].{ELEMENTS}", self.form),
        }
    }
}

impl FromStr for ContainerPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((head, tail)) = s.rsplit_once('.') else {
            return Err(PathError::NotAContainer(s.to_string()));
        };

        match tail {
            ELEMENTS => {
                let (form, rest) = split_form_prefix(head)?;
                if !rest.is_empty() {
                    return Err(PathError::InvalidSegment {
                        path: s.to_string(),
                        segment: tail.to_string(),
                    });
                }
                Ok(Self::top_level(form))
            }
            CHILD_ITEMS => Ok(Self::children_of(head.parse()?)),
            _ => Err(PathError::NotAContainer(s.to_string())),
        }
    }
}

impl TryFrom<String> for ContainerPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContainerPath> for String {
    fn from(path: ContainerPath) -> Self {
        path.to_string()
    }
}

/// Split `forms[F].a.b` into `F` and the remaining dot-separated parts.
fn split_form_prefix(s: &str) -> Result<(usize, Vec<&str>), PathError> {
    let mut parts = s.split('.');
    let form = parts
        .next()
        .and_then(parse_indexed)
        .and_then(|(name, i)| (name == "forms").then_some(i))
        .ok_or_else(|| PathError::MissingFormPrefix(s.to_string()))?;
    Ok((form, parts.collect()))
}

/// Parse `name[123]` into `("name", 123)`.
fn parse_indexed(part: &str) -> Option<(&str, usize)> {
    let body = part.strip_suffix(']')?;
    let (name, index) = body.split_once('[')?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((name, index.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn root_and_child_display() {
        let root = ElementPath::root(0, 2);
        assert_eq!(root.to_string(), "forms[0].elements[2]");
        let child = root.child(1).child(0);
        assert_eq!(
            child.to_string(),
            "forms[0].elements[2].child_items[1].child_items[0]"
        );
        assert_eq!(child.depth(), 2);
        assert_eq!(child.index(), 0);
    }

    #[test]
    fn parent_and_container() {
        let child = ElementPath::root(1, 0).child(3);
        assert_eq!(child.parent(), Some(ElementPath::root(1, 0)));
        assert_eq!(
            child.container().to_string(),
            "forms[1].elements[0].child_items"
        );
        assert_eq!(
            ElementPath::root(1, 0).container().to_string(),
            "forms[1].elements"
        );
        assert!(ElementPath::root(1, 0).parent().is_none());
    }

    #[test]
    fn parse_element_path() {
        let path: ElementPath = "forms[0].elements[4].child_items[2]".parse().unwrap();
        assert_eq!(path.form_index(), 0);
        assert_eq!(
            path.segments(),
            &[Segment::Elements(4), Segment::ChildItems(2)]
        );
    }

    #[test]
    fn parse_rejects_malformed_paths() {
        assert!(matches!(
            "elements[0]".parse::<ElementPath>(),
            Err(PathError::MissingFormPrefix(_))
        ));
        assert!(matches!(
            "forms[0]".parse::<ElementPath>(),
            Err(PathError::NotAnElement(_))
        ));
        assert!(matches!(
            "forms[0].elements".parse::<ElementPath>(),
            Err(PathError::NotAnElement(_))
        ));
        assert!(matches!(
            "forms[0].items[1]".parse::<ElementPath>(),
            Err(PathError::InvalidSegment { .. })
        ));
        assert!("forms[0].elements[-1]".parse::<ElementPath>().is_err());
        assert!("forms[x].elements[1]".parse::<ElementPath>().is_err());
    }

    #[test]
    fn parse_container_paths() {
        let top: ContainerPath = "forms[2].elements".parse().unwrap();
        assert_eq!(top, ContainerPath::top_level(2));
        assert!(top.owner().is_none());

        let nested: ContainerPath = "forms[0].elements[1].child_items".parse().unwrap();
        assert_eq!(nested.owner(), Some(&ElementPath::root(0, 1)));
        assert_eq!(nested.element(3).to_string(), "forms[0].elements[1].child_items[3]");

        assert!("forms[0].elements[1]".parse::<ContainerPath>().is_err());
        assert!("forms[0].elements[1].elements".parse::<ContainerPath>().is_err());
    }

    #[test]
    fn serde_uses_display_form() {
        let path = ElementPath::root(0, 1).child(2);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"forms[0].elements[1].child_items[2]\"");
        let back: ElementPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }

    proptest! {
        #[test]
        fn display_parse_roundtrip(form in 0usize..8, root in 0usize..50, children in proptest::collection::vec(0usize..50, 0..6)) {
            let mut path = ElementPath::root(form, root);
            for c in &children {
                path = path.child(*c);
            }
            let reparsed: ElementPath = path.to_string().parse().unwrap();
            prop_assert_eq!(&reparsed, &path);
            let container: ContainerPath = path.container().to_string().parse().unwrap();
            prop_assert_eq!(container.element(path.index()), path);
        }
    }
}
