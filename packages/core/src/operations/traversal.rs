//! Read-only traversal over a mesh snapshot
//!
//! All walks are iterative and track visited ids, so they terminate even on
//! structurally broken input.

use crate::models::{Mesh, MeshNode};
use crate::operations::MeshError;
use std::collections::HashSet;

impl Mesh {
    /// Root-level nodes sorted by `order` (ties broken by id)
    pub fn root_nodes(&self) -> Vec<&MeshNode> {
        let mut roots: Vec<&MeshNode> = self.nodes().filter(|n| n.is_root()).collect();
        roots.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        roots
    }

    /// Direct children of `node_id` in stored order
    pub fn children_of(&self, node_id: &str) -> Result<Vec<&MeshNode>, MeshError> {
        let node = self
            .node(node_id)
            .ok_or_else(|| MeshError::node_not_found(node_id))?;
        Ok(node
            .children
            .iter()
            .filter_map(|child_id| self.node(child_id))
            .collect())
    }

    /// Ids of the sibling group under `parent_id` (`None` = root group), in order
    pub(crate) fn sibling_ids(&self, parent_id: Option<&str>) -> Vec<String> {
        match parent_id {
            Some(parent_id) => self
                .node(parent_id)
                .map(|parent| parent.children.clone())
                .unwrap_or_default(),
            None => self.root_nodes().into_iter().map(|n| n.id.clone()).collect(),
        }
    }

    /// Depth-first pre-order walk of the subtree under `node_id`, excluding
    /// `node_id` itself
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if `node_id` does not exist.
    pub fn descendants(&self, node_id: &str) -> Result<Vec<&MeshNode>, MeshError> {
        let start = self
            .node(node_id)
            .ok_or_else(|| MeshError::node_not_found(node_id))?;

        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(start.id.as_str());

        let mut result = Vec::new();
        let mut stack: Vec<&str> = start.children.iter().rev().map(String::as_str).collect();

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            if let Some(node) = self.node(id) {
                result.push(node);
                stack.extend(node.children.iter().rev().map(String::as_str));
            }
        }

        Ok(result)
    }

    /// Canonical linear order of the whole forest
    ///
    /// Roots are visited by `order`, each followed depth-first by its
    /// children in stored order. Parents therefore always precede their
    /// descendants. Anchor assignment, navigation and content stitching all
    /// use this order.
    pub fn flatten(&self) -> Vec<&MeshNode> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut result = Vec::with_capacity(self.len());
        let mut stack: Vec<&MeshNode> = self.root_nodes().into_iter().rev().collect();

        while let Some(node) = stack.pop() {
            if !visited.insert(node.id.as_str()) {
                continue;
            }
            result.push(node);
            stack.extend(
                node.children
                    .iter()
                    .rev()
                    .filter_map(|child_id| self.node(child_id)),
            );
        }

        result
    }

    /// Number of ancestors above `node_id` (0 for roots)
    pub fn depth_of(&self, node_id: &str) -> Result<usize, MeshError> {
        let mut current = self
            .node(node_id)
            .ok_or_else(|| MeshError::node_not_found(node_id))?;
        let mut seen: HashSet<&str> = HashSet::new();
        let mut depth = 0;

        while let Some(parent_id) = current.parent_id.as_deref() {
            if !seen.insert(parent_id) {
                break;
            }
            match self.node(parent_id) {
                Some(parent) => {
                    depth += 1;
                    current = parent;
                }
                None => break,
            }
        }

        Ok(depth)
    }
}
