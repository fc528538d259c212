use super::anchors::AnchorMap;
use crate::models::{ContentLookup, Mesh, MeshNode};
use crate::operations::MeshError;
use crate::utils::{escape_html, extract_body, HtmlBuffer};

/// Concatenate the content of `nodes` into one block of sections
///
/// Each node becomes a `<section>` carrying its anchor as element id,
/// followed by its description (if any) and the inner body of its content.
/// Sections are emitted in the order given, normally [`Mesh::flatten`].
///
/// # Errors
///
/// Returns `ContentNotFound` for the first node whose content cannot be
/// resolved. No partial output is returned.
pub fn stitch_content(
    nodes: &[&MeshNode],
    lookup: &dyn ContentLookup,
    anchors: &AnchorMap,
) -> Result<String, MeshError> {
    render_content(nodes, lookup, anchors, true)
}

pub(crate) fn render_content(
    nodes: &[&MeshNode],
    lookup: &dyn ContentLookup,
    anchors: &AnchorMap,
    include_descriptions: bool,
) -> Result<String, MeshError> {
    let mut buf = HtmlBuffer::new();

    for node in nodes {
        let content = lookup
            .get(&node.content_id)
            .ok_or_else(|| MeshError::content_not_found(&node.id, &node.content_id))?;

        match anchors.get(&node.id) {
            Some(anchor) => buf.open(&format!(
                r#"<section id="{}" class="mesh-section">"#,
                escape_html(anchor)
            )),
            None => buf.open(r#"<section class="mesh-section">"#),
        }
        if include_descriptions {
            if let Some(description) = node.description() {
                buf.line(&format!(
                    r#"<p class="mesh-section-description">{}</p>"#,
                    escape_html(description)
                ));
            }
        }
        buf.raw(&extract_body(&content.body));
        buf.close("</section>");
    }

    Ok(buf.finish())
}

/// List `(node_id, content_id)` pairs whose content cannot be resolved
///
/// Dangling content is a reportable inconsistency rather than a structural
/// error, so this never fails. Pairs are returned in flattened order.
pub fn find_dangling_content(mesh: &Mesh, lookup: &dyn ContentLookup) -> Vec<(String, String)> {
    mesh.flatten()
        .into_iter()
        .filter(|node| lookup.get(&node.content_id).is_none())
        .map(|node| (node.id.clone(), node.content_id.clone()))
        .collect()
}
