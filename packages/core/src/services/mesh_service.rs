//! Mesh Service
//!
//! Connects the engine to a [`MeshStore`] for applications: meshes are
//! validated before they are written and after they are read, and exports
//! start from the stored snapshot.
//!
//! The service does not serialize concurrent writers. A caller that reads,
//! mutates and saves a mesh (see [`MeshService::update`]) owns that
//! sequence; the last save wins.

use super::error::MeshServiceError;
use crate::db::{codec, InMemoryMeshStore, MeshStore};
use crate::export::{export_archive_async, export_to_archive, generate_index_document, ExportSettings};
use crate::models::{ContentLookup, ContentSource, Mesh};
use crate::operations::{validate_tree, MeshError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub type Result<T> = std::result::Result<T, MeshServiceError>;

/// Persistence and export orchestration for meshes
///
/// # Examples
///
/// ```rust
/// use docmesh_core::services::MeshService;
/// use docmesh_core::models::NewNode;
///
/// # tokio_test::block_on(async {
/// let service = MeshService::in_memory();
/// let mesh = service.create("Handbook").await.unwrap();
/// let (mesh, _) = mesh.add_node(NewNode::new("intro.html")).unwrap();
/// service.save(&mesh).await.unwrap();
///
/// assert_eq!(service.load(mesh.id()).await.unwrap(), mesh);
/// # });
/// ```
#[derive(Clone)]
pub struct MeshService {
    store: Arc<dyn MeshStore>,
}

impl MeshService {
    pub fn new(store: Arc<dyn MeshStore>) -> Self {
        Self { store }
    }

    /// Service backed by a fresh [`InMemoryMeshStore`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryMeshStore::new()))
    }

    pub fn store(&self) -> &Arc<dyn MeshStore> {
        &self.store
    }

    /// Create an empty mesh and store it
    pub async fn create(&self, name: &str) -> Result<Mesh> {
        let mesh = Mesh::new(name);
        self.save(&mesh).await?;
        Ok(mesh)
    }

    /// Validate and store a mesh, replacing any previous version
    ///
    /// # Errors
    ///
    /// `Mesh(MeshValidationFailed)` if the mesh breaks an invariant; nothing
    /// is written in that case.
    pub async fn save(&self, mesh: &Mesh) -> Result<()> {
        validate_tree(mesh).into_result(mesh.id())?;
        let encoded = codec::encode(mesh)?;
        self.store.put(mesh.id(), encoded).await?;
        tracing::info!("Saved mesh '{}' ({} nodes)", mesh.id(), mesh.len());
        Ok(())
    }

    /// Load and validate a stored mesh
    ///
    /// # Errors
    ///
    /// - `MeshNotFound` if nothing is stored under the id
    /// - `Mesh(MeshValidationFailed)` if the stored data is structurally
    ///   invalid; the data is never repaired
    pub async fn load(&self, mesh_id: &str) -> Result<Mesh> {
        let encoded = self
            .store
            .get(mesh_id)
            .await?
            .ok_or_else(|| MeshServiceError::mesh_not_found(mesh_id))?;

        let mesh = codec::decode(&encoded)?;
        if mesh.id() != mesh_id {
            tracing::warn!(
                "Stored mesh under '{}' carries id '{}'",
                mesh_id,
                mesh.id()
            );
            return Err(crate::db::StoreError::storage(format!(
                "Mesh stored under '{}' has id '{}'",
                mesh_id,
                mesh.id()
            ))
            .into());
        }

        tracing::info!("Loaded mesh '{}' ({} nodes)", mesh.id(), mesh.len());
        Ok(mesh)
    }

    /// Ids of all stored meshes, sorted
    pub async fn list(&self) -> Result<Vec<String>> {
        Ok(self.store.list().await?)
    }

    /// Delete a stored mesh, returning whether it existed
    pub async fn delete(&self, mesh_id: &str) -> Result<bool> {
        let removed = self.store.remove(mesh_id).await?;
        if removed {
            tracing::info!("Deleted mesh '{}'", mesh_id);
        }
        Ok(removed)
    }

    /// Load a mesh, apply `edit` and save the result
    ///
    /// Nothing is written if `edit` fails.
    pub async fn update<F>(&self, mesh_id: &str, edit: F) -> Result<Mesh>
    where
        F: FnOnce(&Mesh) -> std::result::Result<Mesh, MeshError> + Send,
    {
        let current = self.load(mesh_id).await?;
        let next = edit(&current)?;
        self.save(&next).await?;
        Ok(next)
    }

    /// Render the index document of a stored mesh
    pub async fn export_index(
        &self,
        mesh_id: &str,
        lookup: &(dyn ContentLookup + Sync),
        settings: &ExportSettings,
    ) -> Result<String> {
        let mesh = self.load(mesh_id).await?;
        Ok(generate_index_document(&mesh, lookup, settings)?)
    }

    /// Package a stored mesh as a zip archive
    pub async fn export_archive(
        &self,
        mesh_id: &str,
        lookup: &(dyn ContentLookup + Sync),
        settings: &ExportSettings,
    ) -> Result<Vec<u8>> {
        let mesh = self.load(mesh_id).await?;
        Ok(export_to_archive(&mesh, lookup, settings)?)
    }

    /// Package a stored mesh with content fetched from an asynchronous
    /// source, stopping with `ExportCancelled` if `cancel` fires
    pub async fn export_archive_from(
        &self,
        mesh_id: &str,
        source: &dyn ContentSource,
        settings: &ExportSettings,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        let mesh = self.load(mesh_id).await?;
        Ok(export_archive_async(&mesh, source, settings, cancel).await?)
    }
}
