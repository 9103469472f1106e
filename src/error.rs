//! Error types returned by the loader and the fallible accessors.

use crate::loader::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or querying configuration.
///
/// A missing configuration file is not an error (it loads as an empty tree),
/// and neither is a failed include: both degrade silently.
#[derive(Debug, Error)]
pub enum ConfError {
    #[error("failed to read configuration file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{}': {message}", .path.display())]
    Decode { path: PathBuf, message: String },

    #[error("section not found: {key}")]
    SectionNotFound { key: String },

    #[error("document store error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to decode value: {0}")]
    Structured(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConfError>;
