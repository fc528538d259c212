//! Utility functions for DocMesh Core
//!
//! This module provides HTML helpers used by the export engine.

mod html;

pub use html::{
    escape_html, extract_body, sanitize_anchor, sanitize_file_name, HtmlBuffer,
};
