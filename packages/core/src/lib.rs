//! DocMesh Core
//!
//! This crate assembles independently produced HTML documents into a
//! hierarchical *document mesh* (a forest of titled, ordered nodes) and exports
//! that forest as one navigable, self-contained document or archive.
//!
//! # Architecture
//!
//! - **Snapshot mutation**: every structural edit takes a [`Mesh`] by reference
//!   and returns a new snapshot. Nodes are shared between snapshots through
//!   `Arc`, so untouched nodes are never copied.
//! - **Forest, not tree**: any number of parentless nodes may exist. The
//!   preferred root is an advisory hint only.
//! - **Validate or reject**: mutations fail fast with a [`MeshError`] and leave
//!   the input untouched; [`validate_tree`] reports every violation it finds.
//! - **Stateless export**: the export engine flattens a validated snapshot,
//!   resolves content through a [`ContentLookup`] and produces a complete
//!   document or archive, or an error and nothing else.
//!
//! # Modules
//!
//! - [`models`] - Data structures (`Mesh`, `MeshNode`, `Content`)
//! - [`operations`] - Mutation engine, traversal and validation
//! - [`export`] - Anchors, navigation, stitching and archive packaging
//! - [`db`] - Persistence codec and mesh stores
//! - [`services`] - `MeshService` orchestration for applications
//! - [`utils`] - HTML helpers

pub mod db;
pub mod export;
pub mod models;
pub mod operations;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use export::*;
pub use models::*;
pub use operations::*;
pub use services::*;
