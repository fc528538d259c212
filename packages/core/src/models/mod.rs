//! Data Models
//!
//! This module contains the core data structures of a document mesh:
//!
//! - `Mesh` - The forest aggregate, sole owner of its nodes
//! - `MeshNode` - One document reference with position and metadata
//! - `Content` - An HTML payload owned by an external content store
//!
//! Content lookup is abstracted behind [`ContentLookup`] (synchronous) and
//! [`ContentSource`] (asynchronous) so the core never owns content lifecycle.

mod content;
mod mesh;

pub use content::{Content, ContentLookup, ContentSource, InMemoryContentStore, Provenance};
pub use mesh::{Mesh, MeshNode, NewNode, NodeMap, NodeMetadataUpdate};
