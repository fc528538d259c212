//! Mesh mutation engine
//!
//! Every operation validates its preconditions against `self`, builds the
//! next snapshot from a clone of the node map and returns it. On error
//! nothing has been applied; the input snapshot is never modified.
//!
//! After any structural change the affected sibling groups are renumbered in
//! full, so `order` stays a contiguous `0..n` and each parent's `children`
//! always matches its children's `order` values.

use crate::models::{Mesh, MeshNode, NewNode, NodeMap, NodeMetadataUpdate};
use crate::operations::{MeshError, TreeViolation};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

impl Mesh {
    /// Add a node as the last member of its sibling group
    ///
    /// Returns the new snapshot together with the id assigned to the node. The
    /// first node added to an empty mesh also becomes the preferred root.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if `params.parent_id` names a missing node
    /// - `MeshValidationFailed` with a `DuplicateNode` violation if
    ///   `params.id` is already in use
    pub fn add_node(&self, params: NewNode) -> Result<(Mesh, String), MeshError> {
        if let Some(parent_id) = params.parent_id.as_deref() {
            if !self.contains(parent_id) {
                tracing::debug!("add_node rejected: parent '{}' not found", parent_id);
                return Err(MeshError::node_not_found(parent_id));
            }
        }

        let id = match params.id {
            Some(id) => {
                if self.contains(&id) {
                    return Err(MeshError::validation_failed(
                        self.id.clone(),
                        vec![TreeViolation::DuplicateNode { node_id: id }],
                    ));
                }
                id
            }
            None => Uuid::new_v4().to_string(),
        };

        let order = self.sibling_ids(params.parent_id.as_deref()).len();
        let node = MeshNode {
            id: id.clone(),
            content_id: params.content_id,
            title: params.title,
            description: params.description,
            parent_id: params.parent_id.clone(),
            children: Vec::new(),
            order,
        };

        let mut nodes = self.nodes.clone();
        if let Some(parent_id) = params.parent_id.as_deref() {
            if let Some(parent) = nodes.get_mut(parent_id) {
                Arc::make_mut(parent).children.push(id.clone());
            }
        }
        nodes.insert(id.clone(), Arc::new(node));

        let preferred_root = if self.is_empty() {
            Some(id.clone())
        } else {
            self.preferred_root.clone()
        };

        Ok((self.next_snapshot(nodes, preferred_root), id))
    }

    /// Move a node to `new_parent_id` (`None` = root group) at `new_index`
    ///
    /// The index is clamped to the size of the target sibling group. Both the
    /// old and the new sibling group are renumbered. A preferred root moved
    /// under another node hands the hint to the first remaining root.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if the node or the new parent does not exist
    /// - `CyclicDependency` if the new parent is the node itself or one of
    ///   its descendants
    pub fn move_node(
        &self,
        node_id: &str,
        new_parent_id: Option<&str>,
        new_index: usize,
    ) -> Result<Mesh, MeshError> {
        let node = self
            .node(node_id)
            .ok_or_else(|| MeshError::node_not_found(node_id))?;

        if let Some(target_id) = new_parent_id {
            if !self.contains(target_id) {
                return Err(MeshError::node_not_found(target_id));
            }
            let under_itself = target_id == node_id
                || self
                    .descendants(node_id)?
                    .iter()
                    .any(|descendant| descendant.id == target_id);
            if under_itself {
                tracing::debug!(
                    "move_node rejected: '{}' cannot be moved under '{}'",
                    node_id,
                    target_id
                );
                return Err(MeshError::cyclic_dependency(node_id, target_id));
            }
        }

        let old_parent_id = node.parent_id.as_deref();
        let mut nodes = self.nodes.clone();

        let mut old_group = self.sibling_ids(old_parent_id);
        old_group.retain(|id| id != node_id);

        let mut new_group = if old_parent_id == new_parent_id {
            old_group.clone()
        } else {
            renumber(&mut nodes, old_parent_id, &old_group);
            let mut group = self.sibling_ids(new_parent_id);
            group.retain(|id| id != node_id);
            group
        };

        let index = new_index.min(new_group.len());
        new_group.insert(index, node_id.to_string());

        if let Some(moved) = nodes.get_mut(node_id) {
            let new_parent = new_parent_id.map(str::to_string);
            if moved.parent_id != new_parent {
                Arc::make_mut(moved).parent_id = new_parent;
            }
        }
        renumber(&mut nodes, new_parent_id, &new_group);

        let preferred_root = match self.preferred_root.as_deref() {
            Some(hint) if hint == node_id && new_parent_id.is_some() => first_root(&nodes),
            Some(hint) => Some(hint.to_string()),
            None => None,
        };

        Ok(self.next_snapshot(nodes, preferred_root))
    }

    /// Delete a node
    ///
    /// With `cascade` the node and its entire subtree are removed. Without
    /// it, the node's children take its place in its former sibling group,
    /// keeping their relative order. The affected group is renumbered.
    ///
    /// If the preferred root is removed, the first remaining root becomes the
    /// new hint, or the hint is cleared when no roots remain.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the node does not exist.
    pub fn delete_node(&self, node_id: &str, cascade: bool) -> Result<Mesh, MeshError> {
        let node = self
            .node(node_id)
            .ok_or_else(|| MeshError::node_not_found(node_id))?;
        let parent_id = node.parent_id.as_deref();

        let mut removed: HashSet<String> = HashSet::new();
        removed.insert(node_id.to_string());
        if cascade {
            removed.extend(self.descendants(node_id)?.into_iter().map(|n| n.id.clone()));
        }

        let mut nodes = self.nodes.clone();
        let mut group = self.sibling_ids(parent_id);
        let position = group.iter().position(|id| id == node_id);
        group.retain(|id| id != node_id);

        if !cascade {
            let promoted = node.children.clone();
            for child_id in &promoted {
                if let Some(child) = nodes.get_mut(child_id) {
                    Arc::make_mut(child).parent_id = parent_id.map(str::to_string);
                }
            }
            let at = position.unwrap_or(group.len()).min(group.len());
            group.splice(at..at, promoted);
        }

        for id in &removed {
            nodes.remove(id);
        }
        renumber(&mut nodes, parent_id, &group);

        let preferred_root = match self.preferred_root.as_deref() {
            Some(hint) if removed.contains(hint) => first_root(&nodes),
            Some(hint) => Some(hint.to_string()),
            None => None,
        };

        tracing::debug!(
            "Deleted {} node(s) from mesh '{}' (cascade: {})",
            removed.len(),
            self.id,
            cascade
        );

        Ok(self.next_snapshot(nodes, preferred_root))
    }

    /// Replace a node's title and/or description
    ///
    /// Structural fields are untouched and every other node is shared with
    /// the input snapshot.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the node does not exist.
    pub fn update_node_metadata(
        &self,
        node_id: &str,
        update: NodeMetadataUpdate,
    ) -> Result<Mesh, MeshError> {
        if !self.contains(node_id) {
            return Err(MeshError::node_not_found(node_id));
        }

        let mut nodes = self.nodes.clone();
        if let Some(entry) = nodes.get_mut(node_id) {
            let node = Arc::make_mut(entry);
            if let Some(title) = update.title {
                node.title = title;
            }
            if let Some(description) = update.description {
                node.description = description;
            }
        }

        Ok(self.next_snapshot(nodes, self.preferred_root.clone()))
    }

    /// Set or clear the advisory preferred root
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if the node does not exist
    /// - `MeshValidationFailed` with `InvalidPreferredRoot` if the node is
    ///   not root-level
    pub fn set_preferred_root(&self, node_id: Option<&str>) -> Result<Mesh, MeshError> {
        if let Some(node_id) = node_id {
            let node = self
                .node(node_id)
                .ok_or_else(|| MeshError::node_not_found(node_id))?;
            if !node.is_root() {
                return Err(MeshError::validation_failed(
                    self.id.clone(),
                    vec![TreeViolation::InvalidPreferredRoot {
                        node_id: node_id.to_string(),
                    }],
                ));
            }
        }

        Ok(self.next_snapshot(self.nodes.clone(), node_id.map(str::to_string)))
    }

    /// Return a snapshot with a new display name
    pub fn rename(&self, name: impl Into<String>) -> Mesh {
        let mut next = self.next_snapshot(self.nodes.clone(), self.preferred_root.clone());
        next.name = name.into();
        next
    }

    fn next_snapshot(&self, nodes: NodeMap, preferred_root: Option<String>) -> Mesh {
        Mesh {
            id: self.id.clone(),
            name: self.name.clone(),
            nodes,
            preferred_root,
            created_at: self.created_at,
            modified_at: Utc::now(),
        }
    }
}

/// Rewrite `order` for every member of a sibling group and, for non-root
/// groups, the parent's `children` list. Nodes whose order is already right
/// keep their shared allocation.
fn renumber(nodes: &mut NodeMap, parent_id: Option<&str>, ordered_ids: &[String]) {
    for (index, id) in ordered_ids.iter().enumerate() {
        if let Some(entry) = nodes.get_mut(id) {
            if entry.order != index {
                Arc::make_mut(entry).order = index;
            }
        }
    }

    if let Some(parent_id) = parent_id {
        if let Some(parent) = nodes.get_mut(parent_id) {
            if parent.children != ordered_ids {
                Arc::make_mut(parent).children = ordered_ids.to_vec();
            }
        }
    }
}

fn first_root(nodes: &NodeMap) -> Option<String> {
    nodes
        .values()
        .filter(|n| n.is_root())
        .min_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)))
        .map(|n| n.id.clone())
}
