//! Mesh validator
//!
//! Runs every structural check independently and collects all violations
//! instead of stopping at the first one. The validator has no preconditions
//! and never panics, so it is safe on arbitrary (including corrupted) input:
//! it is used after mutations in tests, before export and on every load.
//!
//! Checks:
//!
//! 1. Key/id agreement of the node map
//! 2. Referential integrity of `parent_id` and `children`
//! 3. Bidirectional parent/child consistency
//! 4. Cycles, along both `children` edges and `parent_id` chains, across
//!    every connected component
//! 5. Reachability from the root set
//! 6. Contiguous sibling ordering
//! 7. Preferred root hint

use crate::models::{Mesh, NodeMap};
use crate::operations::{MeshError, TreeViolation};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Outcome of [`validate_tree`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<TreeViolation>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<TreeViolation>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Convert into `MeshValidationFailed` when any violation was found
    pub fn into_result(self, mesh_id: impl Into<String>) -> Result<(), MeshError> {
        if self.valid {
            Ok(())
        } else {
            Err(MeshError::validation_failed(mesh_id, self.errors))
        }
    }
}

/// Validate every structural invariant of a mesh
pub fn validate_tree(mesh: &Mesh) -> ValidationReport {
    validate_nodes(&mesh.nodes, mesh.preferred_root.as_deref())
}

/// Whether the mesh contains any cycle
pub fn detect_cycles(mesh: &Mesh) -> bool {
    !find_cycles(&mesh.nodes).is_empty()
}

/// Validate a raw node map; used directly by the persistence codec
pub(crate) fn validate_nodes(nodes: &NodeMap, preferred_root: Option<&str>) -> ValidationReport {
    let mut errors = Vec::new();

    check_keys(nodes, &mut errors);
    check_references(nodes, &mut errors);
    errors.extend(find_cycles(nodes));
    check_reachability(nodes, &mut errors);
    check_ordering(nodes, &mut errors);
    check_preferred_root(nodes, preferred_root, &mut errors);

    ValidationReport::from_errors(errors)
}

fn check_keys(nodes: &NodeMap, errors: &mut Vec<TreeViolation>) {
    for (key, node) in nodes {
        if key != &node.id {
            errors.push(TreeViolation::IdMismatch {
                key: key.clone(),
                node_id: node.id.clone(),
            });
        }
    }
}

fn check_references(nodes: &NodeMap, errors: &mut Vec<TreeViolation>) {
    for (id, node) in nodes {
        if let Some(parent_id) = &node.parent_id {
            match nodes.get(parent_id) {
                None => errors.push(TreeViolation::MissingParent {
                    node_id: id.clone(),
                    parent_id: parent_id.clone(),
                }),
                Some(parent) if !parent.children.contains(id) => {
                    errors.push(TreeViolation::NotListedByParent {
                        node_id: id.clone(),
                        parent_id: parent_id.clone(),
                    })
                }
                Some(_) => {}
            }
        }

        for child_id in &node.children {
            match nodes.get(child_id) {
                None => errors.push(TreeViolation::MissingChild {
                    parent_id: id.clone(),
                    child_id: child_id.clone(),
                }),
                Some(child) if child.parent_id.as_deref() != Some(id.as_str()) => {
                    errors.push(TreeViolation::ChildParentMismatch {
                        parent_id: id.clone(),
                        child_id: child_id.clone(),
                        actual_parent: child.parent_id.clone(),
                    })
                }
                Some(_) => {}
            }
        }
    }
}

/// Find cycles along `children` edges (depth-first with an explicit
/// recursion stack, started from every node) and along `parent_id` chains.
/// Each cycle is reported once, members sorted by id.
fn find_cycles(nodes: &NodeMap) -> Vec<TreeViolation> {
    let mut found: BTreeSet<Vec<String>> = BTreeSet::new();

    // Children edges
    let mut finished: HashSet<&str> = HashSet::new();
    for start in nodes.keys() {
        if finished.contains(start.as_str()) {
            continue;
        }

        let mut path: Vec<&str> = vec![start.as_str()];
        let mut on_path: HashMap<&str, usize> = HashMap::from([(start.as_str(), 0)]);
        let mut cursors: Vec<usize> = vec![0];

        while let Some(&current) = path.last() {
            let depth = path.len() - 1;
            let children = nodes
                .get(current)
                .map(|n| n.children.as_slice())
                .unwrap_or(&[]);

            if cursors[depth] >= children.len() {
                finished.insert(current);
                on_path.remove(current);
                path.pop();
                cursors.pop();
                continue;
            }

            let child = children[cursors[depth]].as_str();
            cursors[depth] += 1;

            if let Some(&index) = on_path.get(child) {
                found.insert(sorted_members(&path[index..]));
            } else if !finished.contains(child) && nodes.contains_key(child) {
                on_path.insert(child, path.len());
                path.push(child);
                cursors.push(0);
            }
        }
    }

    // Parent chains
    let mut cleared: HashSet<&str> = HashSet::new();
    for start in nodes.keys() {
        let mut chain: Vec<&str> = Vec::new();
        let mut position: HashMap<&str, usize> = HashMap::new();
        let mut current = Some(start.as_str());

        while let Some(id) = current {
            if cleared.contains(id) {
                break;
            }
            if let Some(&index) = position.get(id) {
                found.insert(sorted_members(&chain[index..]));
                break;
            }
            position.insert(id, chain.len());
            chain.push(id);
            current = nodes.get(id).and_then(|n| n.parent_id.as_deref());
        }

        cleared.extend(chain);
    }

    found
        .into_iter()
        .map(|node_ids| TreeViolation::Cycle { node_ids })
        .collect()
}

fn sorted_members(members: &[&str]) -> Vec<String> {
    let mut ids: Vec<String> = members.iter().map(|id| id.to_string()).collect();
    ids.sort();
    ids.dedup();
    ids
}

fn check_reachability(nodes: &NodeMap, errors: &mut Vec<TreeViolation>) {
    let mut reached: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = nodes
        .values()
        .filter(|n| n.parent_id.is_none())
        .map(|n| n.id.as_str())
        .collect();

    while let Some(id) = stack.pop() {
        if !reached.insert(id) {
            continue;
        }
        if let Some(node) = nodes.get(id) {
            stack.extend(
                node.children
                    .iter()
                    .map(String::as_str)
                    .filter(|child| nodes.contains_key(*child)),
            );
        }
    }

    for id in nodes.keys() {
        if !reached.contains(id.as_str()) {
            errors.push(TreeViolation::Orphan {
                node_id: id.clone(),
            });
        }
    }
}

fn check_ordering(nodes: &NodeMap, errors: &mut Vec<TreeViolation>) {
    let mut root_orders: Vec<usize> = nodes
        .values()
        .filter(|n| n.parent_id.is_none())
        .map(|n| n.order)
        .collect();
    root_orders.sort_unstable();
    if !is_contiguous(&root_orders) {
        errors.push(TreeViolation::OrderNotContiguous {
            parent_id: None,
            orders: root_orders,
        });
    }

    for (id, node) in nodes {
        let orders: Vec<usize> = node
            .children
            .iter()
            .filter_map(|child_id| nodes.get(child_id))
            .map(|child| child.order)
            .collect();
        if !is_contiguous(&orders) {
            errors.push(TreeViolation::OrderNotContiguous {
                parent_id: Some(id.clone()),
                orders,
            });
        }
    }
}

fn is_contiguous(orders: &[usize]) -> bool {
    orders.iter().enumerate().all(|(index, order)| index == *order)
}

fn check_preferred_root(
    nodes: &NodeMap,
    preferred_root: Option<&str>,
    errors: &mut Vec<TreeViolation>,
) {
    if let Some(hint) = preferred_root {
        let is_root = nodes.get(hint).is_some_and(|n| n.parent_id.is_none());
        if !is_root {
            errors.push(TreeViolation::InvalidPreferredRoot {
                node_id: hint.to_string(),
            });
        }
    }
}
