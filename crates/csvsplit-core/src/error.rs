//! Error types for csvsplit-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in csvsplit-core
///
/// Row-level problems (short rows, undecodable records) are not errors;
/// they are counted in the [`SplitReport`](crate::SplitReport).
#[derive(Debug, Error)]
pub enum Error {
    /// A parameter was rejected before any file was touched
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Failed to open or read the source CSV
    #[error("failed to read source '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or write an output chunk
    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a batch file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for errors raised by parameter validation
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }

    /// The file involved in an I/O failure, if any
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Error::Read { path, .. } | Error::Write { path, .. } | Error::FileRead { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }
}
