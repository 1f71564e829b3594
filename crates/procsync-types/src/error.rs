use thiserror::Error;

/// Errors produced while parsing element and container paths.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("path must start with 'forms[<n>]': {0}")]
    MissingFormPrefix(String),

    #[error("invalid path segment '{segment}' in {path}")]
    InvalidSegment { path: String, segment: String },

    #[error("path addresses a container, not an element: {0}")]
    NotAnElement(String),

    #[error("path does not end in a container: {0}")]
    NotAContainer(String),
}
