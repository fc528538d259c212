//! Persistence Codec
//!
//! Text encoding of a [`Mesh`] as pretty-printed JSON:
//!
//! ```json
//! {
//!   "version": 1,
//!   "id": "…",
//!   "name": "Handbook",
//!   "rootNodeId": "…",
//!   "nodes": [["<node id>", { "id": "<node id>", "contentId": "…", … }]],
//!   "createdDate": "2024-05-01T09:30:00.123456789Z",
//!   "modifiedDate": "2024-05-01T09:31:12.000000001Z"
//! }
//! ```
//!
//! Nodes are written in id order, so encoding is deterministic. Timestamps
//! are RFC 3339 with nanosecond precision, so `decode(encode(mesh))` is equal
//! to `mesh` field for field.
//!
//! Decoding never repairs data. Anything that breaks an invariant is refused
//! with `MeshValidationFailed`.

use super::error::StoreError;
use crate::models::{Mesh, MeshNode, NodeMap};
use crate::operations::validation::validate_nodes;
use crate::operations::{MeshError, TreeViolation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::sync::Arc;

/// Current encoding version
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MeshRecordRef<'a> {
    version: u32,
    id: &'a str,
    name: &'a str,
    root_node_id: Option<&'a str>,
    nodes: Vec<(&'a str, &'a MeshNode)>,
    created_date: DateTime<Utc>,
    modified_date: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MeshRecord {
    version: u32,
    id: String,
    name: String,
    #[serde(default)]
    root_node_id: Option<String>,
    #[serde(default)]
    nodes: Vec<(String, MeshNode)>,
    created_date: DateTime<Utc>,
    modified_date: DateTime<Utc>,
}

/// Encode a mesh as JSON text
pub fn encode(mesh: &Mesh) -> Result<String, StoreError> {
    let record = MeshRecordRef {
        version: FORMAT_VERSION,
        id: &mesh.id,
        name: &mesh.name,
        root_node_id: mesh.preferred_root.as_deref(),
        nodes: mesh
            .nodes
            .iter()
            .map(|(key, node)| (key.as_str(), node.as_ref()))
            .collect(),
        created_date: mesh.created_at,
        modified_date: mesh.modified_at,
    };
    Ok(serde_json::to_string_pretty(&record)?)
}

/// Decode JSON text into a validated mesh
///
/// # Errors
///
/// - `Serialization` if the text is not a mesh record
/// - `UnsupportedVersion` if the record has another format version
/// - `Invalid(MeshValidationFailed)` if the node list repeats an id or the
///   structure breaks any invariant; every violation found is reported
pub fn decode(text: &str) -> Result<Mesh, StoreError> {
    let record: MeshRecord = serde_json::from_str(text)?;

    if record.version != FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: record.version,
            expected: FORMAT_VERSION,
        });
    }

    let mut nodes = NodeMap::new();
    let mut violations = Vec::new();
    for (key, node) in record.nodes {
        match nodes.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(node));
            }
            Entry::Occupied(slot) => violations.push(TreeViolation::DuplicateNode {
                node_id: slot.key().clone(),
            }),
        }
    }

    violations.extend(validate_nodes(&nodes, record.root_node_id.as_deref()).errors);
    if !violations.is_empty() {
        tracing::warn!(
            "Refusing to load mesh '{}': {} violation(s)",
            record.id,
            violations.len()
        );
        return Err(MeshError::validation_failed(record.id, violations).into());
    }

    Ok(Mesh::from_parts(
        record.id,
        record.name,
        nodes,
        record.root_node_id,
        record.created_date,
        record.modified_date,
    ))
}
