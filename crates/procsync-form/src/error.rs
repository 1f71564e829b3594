//! Error types for form trees.

use crate::tree::NodeId;

/// Errors that can occur while building or querying form trees.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// The form XML is not well-formed.
    #[error("malformed form XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// A node id does not belong to the tree.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// Children were attached to an element whose type cannot hold them.
    #[error("element '{name}' of type '{element_type}' cannot have children")]
    NotAContainer { name: String, element_type: String },

    /// A position directive is neither `start`, `end`, nor a decimal index.
    #[error("invalid position: '{0}' (expected start, end, or an index)")]
    InvalidPosition(String),
}

/// Convenience alias for form results.
pub type FormResult<T> = Result<T, FormError>;
