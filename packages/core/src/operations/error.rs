//! Error types for mesh operations
//!
//! This module defines the closed set of errors the mutation and export
//! engines can return, plus the individual invariant violations reported by
//! the validator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during mesh operations
///
/// Every variant carries the offending id(s) so callers can map each kind to
/// a distinct message without parsing strings.
///
/// # Examples
///
/// ```rust
/// use docmesh_core::operations::MeshError;
///
/// let err = MeshError::cyclic_dependency("a", "b");
/// assert_eq!(
///     err.to_string(),
///     "Cannot move node 'a' under 'b': the target is the node itself or one of its descendants"
/// );
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Referenced node does not exist
    ///
    /// Raised when the subject of an operation or its stated parent is absent.
    #[error("Node '{node_id}' does not exist")]
    NodeNotFound { node_id: String },

    /// A move would place a node under itself or one of its descendants
    #[error("Cannot move node '{node_id}' under '{target_id}': the target is the node itself or one of its descendants")]
    CyclicDependency { node_id: String, target_id: String },

    /// A node's content id has no resolvable content (export only)
    #[error("Content '{content_id}' referenced by node '{node_id}' was not found")]
    ContentNotFound { node_id: String, content_id: String },

    /// One or more structural invariants do not hold
    #[error("Mesh '{mesh_id}' failed validation with {} violation(s)", .violations.len())]
    MeshValidationFailed {
        mesh_id: String,
        violations: Vec<TreeViolation>,
    },

    /// An asynchronous export was cancelled before it completed
    #[error("Export was cancelled")]
    ExportCancelled,

    /// Writing the archive failed
    #[error("Archive packaging failed: {reason}")]
    ArchiveFailed { reason: String },
}

impl MeshError {
    /// Create a NodeNotFound error
    pub fn node_not_found(node_id: impl Into<String>) -> Self {
        Self::NodeNotFound {
            node_id: node_id.into(),
        }
    }

    /// Create a CyclicDependency error
    pub fn cyclic_dependency(node_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self::CyclicDependency {
            node_id: node_id.into(),
            target_id: target_id.into(),
        }
    }

    /// Create a ContentNotFound error
    pub fn content_not_found(node_id: impl Into<String>, content_id: impl Into<String>) -> Self {
        Self::ContentNotFound {
            node_id: node_id.into(),
            content_id: content_id.into(),
        }
    }

    /// Create a MeshValidationFailed error
    pub fn validation_failed(mesh_id: impl Into<String>, violations: Vec<TreeViolation>) -> Self {
        Self::MeshValidationFailed {
            mesh_id: mesh_id.into(),
            violations,
        }
    }

    /// Create an ArchiveFailed error
    pub fn archive_failed(reason: impl Into<String>) -> Self {
        Self::ArchiveFailed {
            reason: reason.into(),
        }
    }
}

/// A single structural invariant violation
///
/// The validator returns every violation it finds, so a broken mesh usually
/// produces several of these at once.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeViolation {
    /// The listed nodes form a cycle (members sorted by id)
    #[error("Cycle detected through nodes [{}]", .node_ids.join(", "))]
    Cycle { node_ids: Vec<String> },

    /// Node cannot be reached from any root
    #[error("Node '{node_id}' is not reachable from any root")]
    Orphan { node_id: String },

    /// `parent_id` points at a node that does not exist
    #[error("Node '{node_id}' references missing parent '{parent_id}'")]
    MissingParent { node_id: String, parent_id: String },

    /// `children` lists a node that does not exist
    #[error("Node '{parent_id}' lists missing child '{child_id}'")]
    MissingChild { parent_id: String, child_id: String },

    /// Node names a parent that does not list it as a child
    #[error("Node '{node_id}' names parent '{parent_id}', which does not list it as a child")]
    NotListedByParent { node_id: String, parent_id: String },

    /// Parent lists a child whose `parent_id` points elsewhere
    #[error("Node '{parent_id}' lists child '{child_id}', whose parent is {actual_parent:?}")]
    ChildParentMismatch {
        parent_id: String,
        child_id: String,
        actual_parent: Option<String>,
    },

    /// Sibling `order` values are not `0..n` in stored sequence
    #[error("Sibling group {parent_id:?} has non-contiguous order values {orders:?}")]
    OrderNotContiguous {
        parent_id: Option<String>,
        orders: Vec<usize>,
    },

    /// A node map key disagrees with the node's own id
    #[error("Node stored under key '{key}' carries id '{node_id}'")]
    IdMismatch { key: String, node_id: String },

    /// Two entries share one node id
    #[error("Node id '{node_id}' is used more than once")]
    DuplicateNode { node_id: String },

    /// The preferred root hint is missing or not a root-level node
    #[error("Preferred root '{node_id}' is not an existing root-level node")]
    InvalidPreferredRoot { node_id: String },
}
