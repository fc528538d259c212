use super::anchors::assign_anchors;
use super::navigation::render_navigation;
use super::settings::ExportSettings;
use super::stitch::render_content;
use crate::models::{ContentLookup, Mesh};
use crate::operations::{validate_tree, MeshError};
use crate::utils::{escape_html, HtmlBuffer};

/// Build the standalone index document for a mesh
///
/// The document holds the theme stylesheet, the navigation outline and the
/// stitched content of every node. An empty mesh yields a complete document
/// whose navigation and content blocks are empty.
///
/// # Errors
///
/// - `MeshValidationFailed` if the mesh breaks a structural invariant
/// - `ContentNotFound` if any node's content cannot be resolved
pub fn generate_index_document(
    mesh: &Mesh,
    lookup: &dyn ContentLookup,
    settings: &ExportSettings,
) -> Result<String, MeshError> {
    validate_tree(mesh).into_result(mesh.id())?;

    let nodes = mesh.flatten();
    let anchors = assign_anchors(&nodes);
    let content = render_content(&nodes, lookup, &anchors, settings.include_descriptions)?;
    let navigation = render_navigation(mesh, &anchors, lookup, settings.include_descriptions);

    let mut buf = HtmlBuffer::new();
    buf.line("<!DOCTYPE html>");
    buf.open(r#"<html lang="en">"#);

    buf.open("<head>");
    buf.line(r#"<meta charset="utf-8">"#);
    buf.line(r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#);
    buf.line(r#"<meta name="generator" content="docmesh">"#);
    buf.line(&format!(
        "<title>{}</title>",
        escape_html(settings.title_for(mesh.name()))
    ));
    buf.open("<style>");
    buf.raw(&settings.theme.to_css());
    buf.close("</style>");
    buf.close("</head>");

    buf.open("<body>");
    buf.open(r#"<nav class="mesh-nav" aria-label="Contents">"#);
    buf.raw(&navigation);
    buf.close("</nav>");
    buf.open(r#"<main class="mesh-content">"#);
    buf.raw(&content);
    buf.close("</main>");
    buf.close("</body>");

    buf.close("</html>");

    Ok(buf.finish())
}
