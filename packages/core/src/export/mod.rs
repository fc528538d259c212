//! Mesh Export / Stitching Engine
//!
//! Turns a validated mesh plus its referenced content into either one
//! standalone HTML document or a zip archive:
//!
//! 1. [`Mesh::flatten`](crate::models::Mesh::flatten) fixes the canonical node order
//! 2. [`assign_anchors`] gives every node an element id
//! 3. [`build_navigation`] renders the nested outline linking to those ids
//! 4. [`stitch_content`] concatenates each node's content into sections
//! 5. [`generate_index_document`] wraps navigation, content and theme CSS
//! 6. [`export_to_archive`] packages the document with the raw payloads
//!
//! The engine is stateless. Every call either returns a complete result or
//! an error; partial output is never produced.

mod anchors;
mod archive;
mod document;
mod navigation;
mod settings;
mod stitch;

#[cfg(test)]
mod export_test;

pub use anchors::{assign_anchors, AnchorMap};
pub use archive::{export_archive_async, export_to_archive};
pub use document::generate_index_document;
pub use navigation::build_navigation;
pub use settings::{ExportSettings, Theme};
pub use stitch::{find_dangling_content, stitch_content};
