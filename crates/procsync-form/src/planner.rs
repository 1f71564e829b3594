//! Resolve a symbolic insertion point into a container path and index.

use std::fmt;
use std::str::FromStr;

use procsync_types::ContainerPath;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::FormError;
use crate::tree::ElementTree;

/// Where among a container's children to insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Start,
    End,
    /// Clamped to the number of children.
    Index(usize),
}

impl Position {
    /// Parse like [`FromStr`], but fall back to [`Position::End`] with a
    /// warning on anything unrecognized.
    pub fn parse_lenient(directive: &str) -> Self {
        directive.parse().unwrap_or_else(|_| {
            warn!(directive, "unknown position directive, inserting at end");
            Self::End
        })
    }

    /// Concrete index for a container that currently holds `len` children.
    pub fn resolve(self, len: usize) -> usize {
        match self {
            Self::Start => 0,
            Self::End => len,
            Self::Index(i) => i.min(len),
        }
    }
}

impl FromStr for Position {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            digits if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => digits
                .parse()
                .map(Self::Index)
                .map_err(|_| FormError::InvalidPosition(s.to_string())),
            _ => Err(FormError::InvalidPosition(s.to_string())),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::End => write!(f, "end"),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// A concrete insertion point: the sequence to insert into and the index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertionPoint {
    pub container: ContainerPath,
    pub index: usize,
}

/// Plan an insertion under `parent` (or at the top level when `None`).
///
/// Returns `None` when the parent does not exist or its type cannot hold
/// children.
pub fn plan_insertion(
    tree: &ElementTree,
    parent: Option<&str>,
    position: Position,
) -> Option<InsertionPoint> {
    let Some(parent_name) = parent else {
        return Some(top_level_point(tree, position));
    };

    let Some(owner) = tree.find(parent_name) else {
        warn!(parent = parent_name, "parent element not found");
        return None;
    };
    if !tree.is_container(owner) {
        warn!(
            parent = parent_name,
            element_type = %owner.element_type,
            "parent element cannot have children"
        );
        return None;
    }

    Some(InsertionPoint {
        container: ContainerPath::children_of(owner.path.clone()),
        index: position.resolve(owner.children.len()),
    })
}

/// The top-level container is the sequence holding the existing roots. A
/// tree with no roots has nothing to take it from and targets the first
/// form.
fn top_level_point(tree: &ElementTree, position: Position) -> InsertionPoint {
    let form_index = match tree.roots().next() {
        Some(root) => root.path.form_index(),
        None => {
            debug!(form_index = tree.form_index(), "empty tree, inserting into the first form");
            0
        }
    };
    InsertionPoint {
        container: ContainerPath::top_level(form_index),
        index: position.resolve(tree.root_count()),
    }
}
