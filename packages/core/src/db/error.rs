//! Storage Error Types
//!
//! Errors raised while encoding, decoding or persisting meshes. Structural
//! problems found while decoding are carried as the engine's own
//! [`MeshError`] so callers can match on the same violation list the
//! validator reports.

use crate::operations::MeshError;
use std::path::PathBuf;
use thiserror::Error;

/// Mesh persistence errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Encoded text could not be produced or parsed
    #[error("Failed to serialize mesh: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File system operation failed
    #[error("Storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// No mesh is stored under the id
    #[error("Mesh not found: {0}")]
    NotFound(String),

    /// Backend failure that is not an I/O error
    #[error("Storage error: {0}")]
    Storage(String),

    /// The id cannot be used as a storage key
    #[error("Invalid mesh id: '{0}'")]
    InvalidKey(String),

    /// Encoded data was written by an incompatible format version
    #[error("Unsupported mesh format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Decoded data breaks a structural invariant
    #[error(transparent)]
    Invalid(#[from] MeshError),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn not_found(mesh_id: impl Into<String>) -> Self {
        Self::NotFound(mesh_id.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn invalid_key(mesh_id: impl Into<String>) -> Self {
        Self::InvalidKey(mesh_id.into())
    }
}
