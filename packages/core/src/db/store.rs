//! MeshStore Trait - Persistence Abstraction
//!
//! Stores hold encoded meshes keyed by mesh id. They know nothing about the
//! mesh structure: encoding, decoding and validation happen in
//! [`codec`](super::codec) and in
//! [`MeshService`](crate::services::MeshService), which receives a store
//! through `Arc<dyn MeshStore>`.
//!
//! Writes are last-writer-wins. Saving one mesh is a single localized write;
//! no atomicity across meshes is provided.

use super::error::StoreError;
use async_trait::async_trait;

/// Key-value persistence for encoded meshes
///
/// Implementations must be `Send + Sync` so a store can be shared between
/// tasks.
#[async_trait]
pub trait MeshStore: Send + Sync {
    /// Store `encoded` under `mesh_id`, replacing any previous value
    async fn put(&self, mesh_id: &str, encoded: String) -> Result<(), StoreError>;

    /// Fetch the encoded mesh, or `None` if nothing is stored under the id
    async fn get(&self, mesh_id: &str) -> Result<Option<String>, StoreError>;

    /// Ids of all stored meshes, sorted
    async fn list(&self) -> Result<Vec<String>, StoreError>;

    /// Remove a mesh, returning whether anything was stored under the id
    async fn remove(&self, mesh_id: &str) -> Result<bool, StoreError>;
}
