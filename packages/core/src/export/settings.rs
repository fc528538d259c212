//! Export settings and themes
//!
//! Settings are usually read from a JSON file. Every field uses
//! `#[serde(default)]` so partial files, or files written by an older
//! version, deserialize without error.

use serde::{Deserialize, Serialize};

/// Options for index-document and archive generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSettings {
    /// Document title; the mesh name is used when unset
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Archive entry name of the combined document (default: "index.html")
    #[serde(default = "default_index_file_name")]
    pub index_file_name: String,

    /// Render node descriptions in navigation and content (default: true)
    #[serde(default = "default_include_descriptions")]
    pub include_descriptions: bool,

    #[serde(default)]
    pub theme: Theme,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            title: None,
            index_file_name: default_index_file_name(),
            include_descriptions: default_include_descriptions(),
            theme: Theme::default(),
        }
    }
}

impl ExportSettings {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Document title for a mesh, falling back to its name
    pub fn title_for<'a>(&'a self, mesh_name: &'a str) -> &'a str {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title,
            _ => mesh_name,
        }
    }
}

fn default_index_file_name() -> String {
    "index.html".to_string()
}

fn default_include_descriptions() -> bool {
    true
}

/// Colour scheme rendered into the index document's stylesheet
///
/// The built-in schemes are [`Theme::light`] and [`Theme::dark`]. In a
/// settings file the theme is either a bare name (`"dark"`) or an object;
/// colours missing from the object come from the scheme its `name` selects,
/// or from the light scheme when the name is not built in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ThemeSetting")]
pub struct Theme {
    pub name: String,
    pub background: String,
    pub foreground: String,
    pub accent: String,
    pub muted: String,
    pub border: String,
    pub font_family: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

impl Theme {
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: "#ffffff".to_string(),
            foreground: "#1f2328".to_string(),
            accent: "#0969da".to_string(),
            muted: "#59636e".to_string(),
            border: "#d1d9e0".to_string(),
            font_family: "system-ui, -apple-system, sans-serif".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: "#0d1117".to_string(),
            foreground: "#e6edf3".to_string(),
            accent: "#4493f8".to_string(),
            muted: "#9198a1".to_string(),
            border: "#3d444d".to_string(),
            font_family: "system-ui, -apple-system, sans-serif".to_string(),
        }
    }

    /// Look up a built-in theme by name (case-insensitive)
    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::light()),
            "dark" => Some(Self::dark()),
            _ => None,
        }
    }

    /// Render the stylesheet for the index document
    ///
    /// Colour values are reduced to characters that cannot terminate a
    /// declaration or the surrounding `<style>` element.
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        css.push_str(":root {\n");
        for (var, value) in [
            ("--mesh-bg", &self.background),
            ("--mesh-fg", &self.foreground),
            ("--mesh-accent", &self.accent),
            ("--mesh-muted", &self.muted),
            ("--mesh-border", &self.border),
            ("--mesh-font", &self.font_family),
        ] {
            css.push_str(&format!("  {}: {};\n", var, css_value(value)));
        }
        css.push_str("}\n");
        css.push_str(BASE_CSS);
        css
    }
}

/// Theme as written in a settings file
#[derive(Deserialize)]
#[serde(untagged)]
enum ThemeSetting {
    Named(String),
    Custom(ThemeOverrides),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeOverrides {
    name: Option<String>,
    background: Option<String>,
    foreground: Option<String>,
    accent: Option<String>,
    muted: Option<String>,
    border: Option<String>,
    font_family: Option<String>,
}

impl From<ThemeSetting> for Theme {
    fn from(setting: ThemeSetting) -> Self {
        let overrides = match setting {
            ThemeSetting::Named(name) => ThemeOverrides {
                name: Some(name),
                background: None,
                foreground: None,
                accent: None,
                muted: None,
                border: None,
                font_family: None,
            },
            ThemeSetting::Custom(overrides) => overrides,
        };

        let mut theme = overrides
            .name
            .as_deref()
            .and_then(Theme::by_name)
            .unwrap_or_else(|| {
                tracing::debug!("Theme {:?} is not built in, using light colours", overrides.name);
                Theme::light()
            });
        if let Some(name) = overrides.name {
            theme.name = name;
        }
        for (slot, value) in [
            (&mut theme.background, overrides.background),
            (&mut theme.foreground, overrides.foreground),
            (&mut theme.accent, overrides.accent),
            (&mut theme.muted, overrides.muted),
            (&mut theme.border, overrides.border),
            (&mut theme.font_family, overrides.font_family),
        ] {
            if let Some(value) = value {
                *slot = value;
            }
        }
        theme
    }
}

const BASE_CSS: &str = "\
body { margin: 0; display: flex; background: var(--mesh-bg); color: var(--mesh-fg); font-family: var(--mesh-font); line-height: 1.5; }
a { color: var(--mesh-accent); }
.mesh-nav { flex: 0 0 18rem; padding: 1rem; border-right: 1px solid var(--mesh-border); position: sticky; top: 0; max-height: 100vh; overflow-y: auto; }
.mesh-nav-list { list-style: none; margin: 0; padding-left: 1rem; }
.mesh-nav > .mesh-nav-list { padding-left: 0; }
.mesh-nav-item.preferred > a { font-weight: 600; }
.mesh-nav-description, .mesh-section-description { color: var(--mesh-muted); font-size: 0.875rem; margin: 0.125rem 0 0.5rem; }
.mesh-content { flex: 1; padding: 1rem 2rem; min-width: 0; }
.mesh-section { padding-bottom: 2rem; border-bottom: 1px solid var(--mesh-border); }
";

fn css_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>'))
        .collect::<String>()
        .trim()
        .to_string()
}
