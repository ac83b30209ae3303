//! Error types for header amalgamation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while inlining and emitting a single header.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file not found {path} when building {library}")]
    MissingFile { path: PathBuf, library: String },

    #[error("cannot derive a header guard from {path}: expected a path containing 'include/{prefix}'")]
    MalformedGuardPath { path: PathBuf, prefix: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for single-header generation.
pub type Result<T> = std::result::Result<T, Error>;
