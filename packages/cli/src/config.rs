use anyhow::Context;
use docmesh_core::{Content, ExportSettings, InMemoryContentStore, Provenance};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const STORE_DIR_ENV: &str = "DOCMESH_STORE_DIR";
pub const CONTENT_DIR_ENV: &str = "DOCMESH_CONTENT_DIR";

pub const DEFAULT_STORE_DIR: &str = ".docmesh/meshes";
pub const DEFAULT_CONTENT_DIR: &str = ".docmesh/content";

/// Manifest listing the content items in the content directory
pub const CONTENT_MANIFEST: &str = "contents.json";

/// Resolved CLI configuration
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory of the file mesh store
    pub store_dir: PathBuf,

    /// Directory holding `contents.json` and the payload files it names
    pub content_dir: PathBuf,

    pub export: ExportSettings,
}

impl CliConfig {
    pub fn new(store_dir: impl Into<PathBuf>, content_dir: impl Into<PathBuf>) -> Self {
        Self {
            store_dir: store_dir.into(),
            content_dir: content_dir.into(),
            export: ExportSettings::default(),
        }
    }

    /// Merge export settings from a JSON file
    ///
    /// Fields missing from the file keep their defaults.
    pub fn with_settings_file(mut self, path: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = path {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings file {}", path.display()))?;
            self.export = serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
        }
        Ok(self)
    }

    /// Load the content store described by the manifest
    ///
    /// A missing manifest yields an empty store, so meshes can still be
    /// inspected and edited without any content on disk.
    pub fn load_contents(&self) -> anyhow::Result<InMemoryContentStore> {
        let manifest_path = self.content_dir.join(CONTENT_MANIFEST);
        if !manifest_path.exists() {
            tracing::warn!(
                "No content manifest at {}; using an empty content store",
                manifest_path.display()
            );
            return Ok(InMemoryContentStore::new());
        }

        let text = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
        let entries: Vec<ManifestEntry> = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {}", manifest_path.display()))?;

        let mut store = InMemoryContentStore::new();
        for entry in entries {
            let body = match (entry.body, entry.file) {
                (Some(body), _) => body,
                (None, Some(file)) => {
                    let path = self.content_dir.join(&file);
                    std::fs::read_to_string(&path).with_context(|| {
                        format!("Failed to read content '{}' from {}", entry.id, path.display())
                    })?
                }
                (None, None) => {
                    anyhow::bail!("Content '{}' has neither a body nor a file", entry.id)
                }
            };
            store.insert(Content::new(entry.id, entry.display_name, body, entry.provenance));
        }

        tracing::info!("Loaded {} content item(s) from {}", store.len(), manifest_path.display());
        Ok(store)
    }
}

/// One entry of `contents.json`
///
/// The payload is either inline (`body`) or a file relative to the content
/// directory (`file`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub id: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default = "default_provenance")]
    pub provenance: Provenance,
}

fn default_provenance() -> Provenance {
    Provenance::Html
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmesh_core::{ContentLookup, Theme};
    use tempfile::TempDir;

    #[test]
    fn test_settings_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(
            &path,
            r##"{"title": "Manual", "theme": {"name": "dark", "background": "#000", "foreground": "#fff", "accent": "#09f", "muted": "#888", "border": "#333", "fontFamily": "serif"}}"##,
        )
        .unwrap();

        let config = CliConfig::new("s", "c").with_settings_file(Some(path.as_path())).unwrap();
        assert_eq!(config.export.title.as_deref(), Some("Manual"));
        assert_eq!(config.export.theme.background, "#000");
        assert_eq!(config.export.index_file_name, "index.html");
    }

    #[test]
    fn test_settings_file_selects_theme_by_name() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let config = CliConfig::new("s", "c").with_settings_file(Some(path.as_path())).unwrap();
        assert_eq!(config.export.theme, Theme::dark());
        assert_eq!(config.export.index_file_name, "index.html");
    }

    #[test]
    fn test_no_settings_file_keeps_defaults() {
        let config = CliConfig::new("s", "c").with_settings_file(None).unwrap();
        assert_eq!(config.export, ExportSettings::default());
    }

    #[test]
    fn test_missing_manifest_gives_empty_store() {
        let temp = TempDir::new().unwrap();
        let config = CliConfig::new("s", temp.path());
        assert!(config.load_contents().unwrap().is_empty());
    }

    #[test]
    fn test_manifest_with_inline_and_file_bodies() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("setup.html"), "<p>setup</p>").unwrap();
        std::fs::write(
            temp.path().join(CONTENT_MANIFEST),
            r#"[
                {"id": "intro", "displayName": "Intro", "body": "<p>intro</p>"},
                {"id": "setup", "displayName": "Setup", "file": "setup.html", "provenance": "markdown"}
            ]"#,
        )
        .unwrap();

        let store = CliConfig::new("s", temp.path()).load_contents().unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("intro").unwrap().body, "<p>intro</p>");
        let setup = store.get("setup").unwrap();
        assert_eq!(setup.body, "<p>setup</p>");
        assert_eq!(setup.provenance, Provenance::Markdown);
    }

    #[test]
    fn test_manifest_entry_without_payload_is_an_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(CONTENT_MANIFEST), r#"[{"id": "x"}]"#).unwrap();
        assert!(CliConfig::new("s", temp.path()).load_contents().is_err());
    }
}
