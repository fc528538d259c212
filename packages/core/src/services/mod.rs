//! Application Services
//!
//! - `MeshService` - validated persistence and export of stored meshes
//!
//! Services coordinate between the persistence layer and the engine and
//! enforce the load/save validation rules.

mod error;
pub mod mesh_service;


pub use error::MeshServiceError;
pub use mesh_service::MeshService;
