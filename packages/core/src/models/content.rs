//! Content Store Contract
//!
//! Meshes reference HTML payloads by opaque content id. The payloads live in
//! an external store whose lifecycle the core never manages; the core only
//! reads through one of two traits:
//!
//! - [`ContentLookup`] for synchronous, in-process stores
//! - [`ContentSource`] for remote or otherwise asynchronous stores
//!
//! [`InMemoryContentStore`] implements both and is what tests and the CLI use.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a content payload came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// HTML generated from markdown by an external converter
    Markdown,
    /// HTML supplied directly
    Html,
}

/// An HTML payload held by the content store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: String,

    /// The content's own name, used as a fallback label and archive entry name
    pub display_name: String,

    /// HTML body; may be a full document or a fragment
    pub body: String,

    pub provenance: Provenance,
}

impl Content {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        body: impl Into<String>,
        provenance: Provenance,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            body: body.into(),
            provenance,
        }
    }

    /// Convenience constructor for directly supplied HTML
    pub fn html(
        id: impl Into<String>,
        display_name: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self::new(id, display_name, body, Provenance::Html)
    }
}

/// Synchronous read access to a content store
pub trait ContentLookup {
    /// Resolve a content id, or `None` when the content is absent
    fn get(&self, content_id: &str) -> Option<&Content>;
}

/// Asynchronous read access to a content store
///
/// Only the export engine's content-resolution step uses this trait.
/// Mutation operations never touch content payloads.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, content_id: &str) -> Option<Content>;
}

/// Content store backed by a `HashMap`
#[derive(Debug, Clone, Default)]
pub struct InMemoryContentStore {
    contents: HashMap<String, Content>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl IntoIterator<Item = Content>) -> Self {
        let mut store = Self::new();
        for content in contents {
            store.insert(content);
        }
        store
    }

    /// Insert or replace a content entry, returning the previous one
    pub fn insert(&mut self, content: Content) -> Option<Content> {
        self.contents.insert(content.id.clone(), content)
    }

    pub fn remove(&mut self, content_id: &str) -> Option<Content> {
        self.contents.remove(content_id)
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

impl ContentLookup for InMemoryContentStore {
    fn get(&self, content_id: &str) -> Option<&Content> {
        self.contents.get(content_id)
    }
}

impl ContentLookup for HashMap<String, Content> {
    fn get(&self, content_id: &str) -> Option<&Content> {
        HashMap::get(self, content_id)
    }
}

#[async_trait]
impl ContentSource for InMemoryContentStore {
    async fn fetch(&self, content_id: &str) -> Option<Content> {
        self.contents.get(content_id).cloned()
    }
}
