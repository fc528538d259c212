use super::anchors::AnchorMap;
use crate::models::{ContentLookup, Mesh, MeshNode};
use crate::utils::{escape_html, HtmlBuffer};
use std::collections::HashSet;

enum Step<'a> {
    Enter(&'a MeshNode),
    CloseList,
    CloseItem,
}

/// Render the nested outline of a mesh
///
/// Root-level nodes are listed by `order` and each node's children in
/// stored order, so entries appear in exactly the sequence of
/// [`Mesh::flatten`]. Every entry links to the node's anchor. An empty mesh
/// renders as an empty string.
pub fn build_navigation(mesh: &Mesh, anchors: &AnchorMap, lookup: &dyn ContentLookup) -> String {
    render_navigation(mesh, anchors, lookup, true)
}

pub(crate) fn render_navigation(
    mesh: &Mesh,
    anchors: &AnchorMap,
    lookup: &dyn ContentLookup,
    include_descriptions: bool,
) -> String {
    let roots = mesh.root_nodes();
    if roots.is_empty() {
        return String::new();
    }

    let mut buf = HtmlBuffer::new();
    let mut visited: HashSet<&str> = HashSet::new();

    buf.open(r#"<ul class="mesh-nav-list">"#);
    let mut stack: Vec<Step> = vec![Step::CloseList];
    stack.extend(roots.into_iter().rev().map(Step::Enter));

    while let Some(step) = stack.pop() {
        match step {
            Step::CloseList => buf.close("</ul>"),
            Step::CloseItem => buf.close("</li>"),
            Step::Enter(node) => {
                if !visited.insert(node.id.as_str()) {
                    continue;
                }

                if mesh.preferred_root() == Some(node.id.as_str()) {
                    buf.open(r#"<li class="mesh-nav-item preferred">"#);
                } else {
                    buf.open(r#"<li class="mesh-nav-item">"#);
                }

                let label = escape_html(&display_label(node, lookup));
                match anchors.get(&node.id) {
                    Some(anchor) => {
                        buf.line(&format!(r##"<a href="#{}">{}</a>"##, escape_html(anchor), label))
                    }
                    None => buf.line(&format!("<span>{}</span>", label)),
                }

                if include_descriptions {
                    if let Some(description) = node.description() {
                        buf.line(&format!(
                            r#"<p class="mesh-nav-description">{}</p>"#,
                            escape_html(description)
                        ));
                    }
                }

                stack.push(Step::CloseItem);
                let children: Vec<&MeshNode> = node
                    .children
                    .iter()
                    .filter_map(|child_id| mesh.node(child_id))
                    .filter(|child| !visited.contains(child.id.as_str()))
                    .collect();
                if !children.is_empty() {
                    buf.open(r#"<ul class="mesh-nav-list">"#);
                    stack.push(Step::CloseList);
                    stack.extend(children.into_iter().rev().map(Step::Enter));
                }
            }
        }
    }

    buf.finish()
}

/// Label for a node: its title, else the content's display name, else the
/// content id
pub(crate) fn display_label(node: &MeshNode, lookup: &dyn ContentLookup) -> String {
    if let Some(title) = node.title() {
        return title.to_string();
    }
    lookup
        .get(&node.content_id)
        .map(|content| content.display_name.trim())
        .filter(|name| !name.is_empty())
        .unwrap_or(node.content_id.as_str())
        .to_string()
}
