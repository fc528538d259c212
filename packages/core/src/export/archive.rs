//! Archive packaging
//!
//! An archive holds the combined index document plus one raw payload per
//! distinct content id, all at the top level. Packaging is all-or-nothing:
//! either the complete archive bytes are returned or an error is.

use super::document::generate_index_document;
use super::settings::ExportSettings;
use crate::models::{Content, ContentLookup, ContentSource, InMemoryContentStore, Mesh};
use crate::operations::{validate_tree, MeshError};
use crate::utils::sanitize_file_name;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use tokio_util::sync::CancellationToken;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Export a mesh as a zip archive
///
/// The first entry is the index document, named by
/// `settings.index_file_name`. It is followed by one entry per distinct
/// content id in flattened order, named after the content's sanitised
/// display name. Names without an extension get `.html`; names that
/// collide (case-insensitively, including with the index) get `-1`, `-2`,
/// … before the extension.
///
/// An empty mesh produces an archive containing only the index document.
///
/// # Errors
///
/// - `MeshValidationFailed` if the mesh breaks a structural invariant
/// - `ContentNotFound` if any node's content cannot be resolved
/// - `ArchiveFailed` if the zip writer fails
pub fn export_to_archive(
    mesh: &Mesh,
    lookup: &dyn ContentLookup,
    settings: &ExportSettings,
) -> Result<Vec<u8>, MeshError> {
    tracing::info!("Exporting mesh '{}' ({} nodes) to archive", mesh.id(), mesh.len());

    let index = generate_index_document(mesh, lookup, settings)?;

    let mut names = EntryNames::default();
    let index_name = names.claim(&settings.index_file_name);

    let mut entries: Vec<(String, &str)> = Vec::new();
    for content in distinct_contents(mesh, lookup)? {
        entries.push((names.claim(&content.display_name), content.body.as_str()));
    }

    let bytes = write_archive(&index_name, &index, &entries)?;
    tracing::info!(
        "Exported mesh '{}': {} entries, {} bytes",
        mesh.id(),
        entries.len() + 1,
        bytes.len()
    );
    Ok(bytes)
}

/// Export with content resolved from an asynchronous source
///
/// Content is fetched one id at a time, checking `cancel` before and during
/// each fetch. The archive is then built on a blocking task. If `cancel`
/// fires at any point the call returns `ExportCancelled` and no output is
/// produced.
///
/// # Errors
///
/// The errors of [`export_to_archive`], plus `ExportCancelled`.
pub async fn export_archive_async(
    mesh: &Mesh,
    source: &dyn ContentSource,
    settings: &ExportSettings,
    cancel: &CancellationToken,
) -> Result<Vec<u8>, MeshError> {
    validate_tree(mesh).into_result(mesh.id())?;

    let mut store = InMemoryContentStore::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for node in mesh.flatten() {
        if !seen.insert(node.content_id.as_str()) {
            continue;
        }
        if cancel.is_cancelled() {
            return Err(cancelled(mesh));
        }
        let fetched = tokio::select! {
            _ = cancel.cancelled() => return Err(cancelled(mesh)),
            content = source.fetch(&node.content_id) => content,
        };
        let content =
            fetched.ok_or_else(|| MeshError::content_not_found(&node.id, &node.content_id))?;
        // Keyed by the referencing id, whatever id the source reports
        store.insert(Content {
            id: node.content_id.clone(),
            ..content
        });
    }

    if cancel.is_cancelled() {
        return Err(cancelled(mesh));
    }

    let mesh_owned = mesh.clone();
    let settings_owned = settings.clone();
    let task = tokio::task::spawn_blocking(move || {
        export_to_archive(&mesh_owned, &store, &settings_owned)
    });

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(cancelled(mesh)),
        joined = task => joined.map_err(|e| MeshError::archive_failed(format!("Archive task failed: {}", e)))?,
    }
}

fn cancelled(mesh: &Mesh) -> MeshError {
    tracing::info!("Export of mesh '{}' cancelled", mesh.id());
    MeshError::ExportCancelled
}

/// Resolve each distinct content id once, in flattened order
fn distinct_contents<'a>(
    mesh: &Mesh,
    lookup: &'a dyn ContentLookup,
) -> Result<Vec<&'a Content>, MeshError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut contents = Vec::new();
    for node in mesh.flatten() {
        if !seen.insert(node.content_id.as_str()) {
            continue;
        }
        let content = lookup
            .get(&node.content_id)
            .ok_or_else(|| MeshError::content_not_found(&node.id, &node.content_id))?;
        contents.push(content);
    }
    Ok(contents)
}

/// Allocates unique archive entry names
#[derive(Default)]
struct EntryNames {
    used: HashSet<String>,
}

impl EntryNames {
    fn claim(&mut self, raw: &str) -> String {
        let mut name = sanitize_file_name(raw);
        if !has_extension(&name) {
            name.push_str(".html");
        }

        let (stem, extension) = split_extension(&name);
        let mut candidate = name.clone();
        let mut counter = 1;
        while self.used.contains(&candidate.to_lowercase()) {
            candidate = format!("{}-{}{}", stem, counter, extension);
            counter += 1;
        }

        self.used.insert(candidate.to_lowercase());
        candidate
    }
}

fn has_extension(name: &str) -> bool {
    matches!(name.rfind('.'), Some(dot) if dot > 0 && dot + 1 < name.len())
}

/// Split `name` into stem and extension (including the dot)
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    }
}

fn write_archive(
    index_name: &str,
    index: &str,
    entries: &[(String, &str)],
) -> Result<Vec<u8>, MeshError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut add = |name: &str, body: &str| -> Result<(), MeshError> {
        writer
            .start_file(name, options)
            .map_err(|e| MeshError::archive_failed(format!("Failed to add '{}': {}", name, e)))?;
        writer
            .write_all(body.as_bytes())
            .map_err(|e| MeshError::archive_failed(format!("Failed to write '{}': {}", name, e)))
    };

    add(index_name, index)?;
    for (name, body) in entries {
        add(name, body)?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| MeshError::archive_failed(format!("Failed to finish archive: {}", e)))?;
    Ok(cursor.into_inner())
}
