//! Mesh Data Structures
//!
//! This module defines the `Mesh` aggregate and its `MeshNode` entries.
//!
//! # Ownership
//!
//! The `nodes` map is the sole owner of every node. Nodes are held behind
//! `Arc`, so producing a new snapshot clones the map spine and shares every
//! node that the operation did not touch. A node that must change is copied
//! on write with `Arc::make_mut`.
//!
//! # Examples
//!
//! ```rust
//! use docmesh_core::models::{Mesh, NewNode};
//!
//! let mesh = Mesh::new("Handbook");
//! let (mesh, intro) = mesh.add_node(NewNode::new("intro.html").with_title("Intro")).unwrap();
//! let (mesh, _setup) = mesh
//!     .add_node(NewNode::new("setup.html").under(&intro))
//!     .unwrap();
//!
//! assert_eq!(mesh.len(), 2);
//! assert_eq!(mesh.preferred_root(), Some(intro.as_str()));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Arena of nodes keyed by node id
pub type NodeMap = BTreeMap<String, Arc<MeshNode>>;

/// One entry in the mesh forest.
///
/// # Fields
///
/// - `id`: Unique identifier, assigned at creation and never changed
/// - `content_id`: Reference into the external content store (not owned)
/// - `title`, `description`: Free-form display strings (empty means unset)
/// - `parent_id`: Parent node, or `None` for a root-level node
/// - `children`: Child ids, always sorted by the children's `order`
/// - `order`: Zero-based contiguous rank among siblings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshNode {
    pub id: String,

    pub content_id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub parent_id: Option<String>,

    #[serde(default)]
    pub children: Vec<String>,

    pub order: usize,
}

impl MeshNode {
    /// Check if this node sits in the root sibling group
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Title, or `None` when it is blank
    pub fn title(&self) -> Option<&str> {
        non_blank(&self.title)
    }

    /// Description, or `None` when it is blank
    pub fn description(&self) -> Option<&str> {
        non_blank(&self.description)
    }
}

fn non_blank(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// The document mesh aggregate.
///
/// A mesh is a *forest*: any number of nodes may have no parent. The
/// `preferred_root` is a hint for the default entry point and carries no
/// structural meaning.
///
/// Instances are immutable from the outside. Every operation in
/// [`crate::operations`] returns a new snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) nodes: NodeMap,
    pub(crate) preferred_root: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) modified_at: DateTime<Utc>,
}

impl Mesh {
    /// Create an empty mesh with a fresh UUID
    pub fn new(name: impl Into<String>) -> Self {
        Self::new_with_id(Uuid::new_v4().to_string(), name)
    }

    /// Create an empty mesh with an explicit id
    pub fn new_with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            nodes: NodeMap::new(),
            preferred_root: None,
            created_at: now,
            modified_at: now,
        }
    }

    /// Assemble a mesh from already validated parts
    pub(crate) fn from_parts(
        id: String,
        name: String,
        nodes: NodeMap,
        preferred_root: Option<String>,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            nodes,
            preferred_root,
            created_at,
            modified_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Advisory default entry point, if any
    pub fn preferred_root(&self) -> Option<&str> {
        self.preferred_root.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    /// Look up a node by id
    pub fn node(&self, id: &str) -> Option<&MeshNode> {
        self.nodes.get(id).map(Arc::as_ref)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Iterate over all nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &MeshNode> {
        self.nodes.values().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check whether two snapshots share the same allocation for a node
    ///
    /// Used to verify that untouched nodes are carried over without copying.
    #[cfg(test)]
    pub(crate) fn shares_node_with(&self, other: &Mesh, id: &str) -> bool {
        match (self.nodes.get(id), other.nodes.get(id)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Parameters for adding a node to a mesh
///
/// The `id` field is normally left empty and a UUID is generated. Callers
/// that track ids themselves (for example an editor doing optimistic updates)
/// may supply one; it must not collide with an existing node.
///
/// # Examples
///
/// ```rust
/// # use docmesh_core::models::NewNode;
/// let params = NewNode::new("guide.html")
///     .under("parent-id")
///     .with_title("Guide")
///     .with_description("Start here");
/// assert_eq!(params.parent_id.as_deref(), Some("parent-id"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct NewNode {
    /// Optional explicit id. If None, a UUID v4 is generated
    pub id: Option<String>,
    /// Content store reference
    pub content_id: String,
    /// Parent node, or None to append to the root sibling group
    pub parent_id: Option<String>,
    pub title: String,
    pub description: String,
}

impl NewNode {
    pub fn new(content_id: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            ..Default::default()
        }
    }

    /// Place the node under `parent_id`
    pub fn under(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Partial metadata update
///
/// Only supplied fields are replaced. Structural fields (`parent_id`,
/// `children`, `order`, `content_id`) cannot be changed through this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadataUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NodeMetadataUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check if update contains any changes
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}
