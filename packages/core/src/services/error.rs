//! Service Layer Error Types

use crate::db::StoreError;
use crate::operations::MeshError;
use thiserror::Error;

/// Mesh service errors
///
/// Structural errors surface as [`MeshError`] whether they come from an
/// operation, an export or from decoding stored data, so callers match on
/// one set of kinds.
#[derive(Error, Debug)]
pub enum MeshServiceError {
    /// No mesh is stored under the id
    #[error("Mesh not found: {mesh_id}")]
    MeshNotFound { mesh_id: String },

    /// Mutation, validation or export failure
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Storage backend failure
    #[error("Storage operation failed: {0}")]
    Store(#[source] StoreError),
}

impl MeshServiceError {
    pub fn mesh_not_found(mesh_id: impl Into<String>) -> Self {
        Self::MeshNotFound {
            mesh_id: mesh_id.into(),
        }
    }

    /// The engine error kind, if this is one
    pub fn as_mesh_error(&self) -> Option<&MeshError> {
        match self {
            Self::Mesh(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for MeshServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Invalid(err) => Self::Mesh(err),
            StoreError::NotFound(mesh_id) => Self::MeshNotFound { mesh_id },
            other => Self::Store(other),
        }
    }
}
