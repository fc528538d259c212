use crate::models::MeshNode;
use crate::utils::sanitize_anchor;
use std::collections::{HashMap, HashSet};

/// Node id → anchor token
pub type AnchorMap = HashMap<String, String>;

/// Assign an element id to every node, in the given order
///
/// Tokens are derived from node ids. Ids that sanitise to the same token
/// are disambiguated with `-1`, `-2`, … in encounter order.
pub fn assign_anchors(nodes: &[&MeshNode]) -> AnchorMap {
    let mut used: HashSet<String> = HashSet::with_capacity(nodes.len());
    let mut anchors = AnchorMap::with_capacity(nodes.len());

    for node in nodes {
        if anchors.contains_key(&node.id) {
            continue;
        }
        let token = sanitize_anchor(&node.id);
        let base = if token.is_empty() {
            "node".to_string()
        } else {
            format!("node-{}", token)
        };

        let mut candidate = base.clone();
        let mut counter = 1;
        while used.contains(&candidate) {
            candidate = format!("{}-{}", base, counter);
            counter += 1;
        }

        used.insert(candidate.clone());
        anchors.insert(node.id.clone(), candidate);
    }

    anchors
}
