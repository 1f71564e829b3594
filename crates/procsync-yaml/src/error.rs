//! Error types for document loading.

use thiserror::Error;

/// Errors that can occur while loading a document.
#[derive(Debug, Error)]
pub enum YamlError {
    /// The YAML text could not be parsed.
    #[error("yaml parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The document root was not a mapping.
    #[error("expected a mapping at the document root, found {found}")]
    NotAMapping { found: &'static str },
}

/// Convenience type alias for document operations.
pub type Result<T> = std::result::Result<T, YamlError>;
