//! Persistence Layer
//!
//! - [`codec`] turns a [`Mesh`](crate::models::Mesh) into JSON text and back,
//!   validating everything it decodes
//! - [`MeshStore`] abstracts where encoded meshes live
//! - [`InMemoryMeshStore`] and [`FileMeshStore`] are the two backends
//!
//! Stores are injected into [`MeshService`](crate::services::MeshService);
//! there is no process-wide storage namespace.

pub mod codec;
mod error;
mod file_store;
mod memory_store;
mod store;

pub use codec::{decode, encode, FORMAT_VERSION};
pub use error::StoreError;
pub use file_store::FileMeshStore;
pub use memory_store::InMemoryMeshStore;
pub use store::MeshStore;
