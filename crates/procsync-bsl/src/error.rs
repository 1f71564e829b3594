//! Error types for the BSL crate.

use std::path::PathBuf;

/// Errors that can occur while loading BSL modules.
#[derive(Debug, thiserror::Error)]
pub enum BslError {
    /// The module file could not be read.
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// None of UTF-8 with BOM, UTF-8, or windows-1251 could decode the bytes.
    #[error("module is not valid UTF-8 or windows-1251 ({len} bytes)")]
    Undecodable { len: usize },
}

/// Convenience alias for BSL results.
pub type BslResult<T> = Result<T, BslError>;
