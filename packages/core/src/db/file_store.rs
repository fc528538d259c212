use super::error::StoreError;
use super::store::MeshStore;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

const EXTENSION: &str = "json";

/// Mesh store holding one `<mesh id>.json` file per mesh in a directory
///
/// The directory is created on the first write. Writes go to a temporary
/// file that is then renamed over the target, so a crash never leaves a
/// half-written mesh behind.
#[derive(Debug, Clone)]
pub struct FileMeshStore {
    dir: PathBuf,
}

impl FileMeshStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `mesh_id`
    ///
    /// Only ASCII letters, digits, `-` and `_` are accepted in ids so a key
    /// can never address a file outside the directory.
    pub fn path_for(&self, mesh_id: &str) -> Result<PathBuf, StoreError> {
        let valid = !mesh_id.is_empty()
            && mesh_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::invalid_key(mesh_id));
        }
        Ok(self.dir.join(format!("{}.{}", mesh_id, EXTENSION)))
    }
}

#[async_trait]
impl MeshStore for FileMeshStore {
    async fn put(&self, mesh_id: &str, encoded: String) -> Result<(), StoreError> {
        let path = self.path_for(mesh_id)?;
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::io(&self.dir, e))?;

        let temp = self.dir.join(format!("{}.{}.tmp", mesh_id, EXTENSION));
        fs::write(&temp, encoded)
            .await
            .map_err(|e| StoreError::io(&temp, e))?;
        fs::rename(&temp, &path)
            .await
            .map_err(|e| StoreError::io(&path, e))?;

        tracing::debug!("Wrote mesh '{}' to {}", mesh_id, path.display());
        Ok(())
    }

    async fn get(&self, mesh_id: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(mesh_id)?;
        match fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.dir, e)),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    async fn remove(&self, mesh_id: &str) -> Result<bool, StoreError> {
        let path = self.path_for(mesh_id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }
}
