use super::error::StoreError;
use super::store::MeshStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mesh store kept in process memory
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMeshStore {
    meshes: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryMeshStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_failed<T>(_: T) -> StoreError {
    StoreError::storage("Failed to acquire lock")
}

#[async_trait]
impl MeshStore for InMemoryMeshStore {
    async fn put(&self, mesh_id: &str, encoded: String) -> Result<(), StoreError> {
        let mut meshes = self.meshes.lock().map_err(lock_failed)?;
        meshes.insert(mesh_id.to_string(), encoded);
        Ok(())
    }

    async fn get(&self, mesh_id: &str) -> Result<Option<String>, StoreError> {
        let meshes = self.meshes.lock().map_err(lock_failed)?;
        Ok(meshes.get(mesh_id).cloned())
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let meshes = self.meshes.lock().map_err(lock_failed)?;
        let mut ids: Vec<String> = meshes.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn remove(&self, mesh_id: &str) -> Result<bool, StoreError> {
        let mut meshes = self.meshes.lock().map_err(lock_failed)?;
        Ok(meshes.remove(mesh_id).is_some())
    }
}
