//! Error types for entity handlers.

/// Errors that can occur when driving handlers.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// No handler is registered for the entity kind.
    #[error("no handler registered for '{0}'")]
    UnknownHandler(String),

    /// A metadata document is not well-formed.
    #[error("malformed metadata XML: {0}")]
    Xml(#[from] roxmltree::Error),
}

/// Convenience alias for handler results.
pub type HandlerResult<T> = Result<T, HandlerError>;
