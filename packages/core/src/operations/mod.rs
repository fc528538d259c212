//! Mesh Operations
//!
//! The mutation engine, traversal helpers and validator. Mutations are
//! implemented as methods on [`Mesh`](crate::models::Mesh) that return a new
//! snapshot:
//!
//! - `add_node` - append a node to a sibling group
//! - `move_node` - re-parent and/or reorder, rejecting cycles
//! - `delete_node` - remove a node, optionally with its subtree
//! - `update_node_metadata` - replace title and description
//! - `set_preferred_root`, `rename` - aggregate-level edits
//!
//! Validation is a free function, [`validate_tree`], that reports every
//! violation it finds.

pub mod error;
mod mutation;
mod traversal;
pub mod validation;


pub use error::{MeshError, TreeViolation};
pub use validation::{detect_cycles, validate_tree, ValidationReport};
