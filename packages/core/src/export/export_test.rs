//! Tests for the export / stitching engine

use super::*;
use crate::models::{
    Content, ContentLookup, ContentSource, InMemoryContentStore, Mesh, MeshNode, NewNode, NodeMap,
};
use crate::operations::MeshError;
use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use std::io::{Cursor, Read};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Helper: intro(setup(faq), usage), appendix
///
/// `faq` and `usage` share one content item.
fn handbook() -> Mesh {
    let mesh = Mesh::new_with_id("handbook", "Handbook");
    let (mesh, _) = mesh
        .add_node(
            NewNode::new("c-intro")
                .with_id("intro")
                .with_title("Introduction")
                .with_description("Start here"),
        )
        .unwrap();
    let (mesh, _) = mesh
        .add_node(NewNode::new("c-setup").with_id("setup").under("intro"))
        .unwrap();
    let (mesh, _) = mesh
        .add_node(
            NewNode::new("c-shared")
                .with_id("faq")
                .under("setup")
                .with_title("FAQ"),
        )
        .unwrap();
    let (mesh, _) = mesh
        .add_node(
            NewNode::new("c-shared")
                .with_id("usage")
                .under("intro")
                .with_title("Usage")
                .with_description("Day to day"),
        )
        .unwrap();
    let (mesh, _) = mesh
        .add_node(NewNode::new("c-appendix").with_id("appendix"))
        .unwrap();
    mesh
}

fn contents() -> InMemoryContentStore {
    InMemoryContentStore::with_contents([
        Content::html(
            "c-intro",
            "Intro",
            "<!DOCTYPE html><html><head><title>x</title></head><body><h1>Intro</h1></body></html>",
        ),
        Content::html("c-setup", "Setup Guide", "<p>Install and run</p>"),
        Content::html("c-shared", "Shared Notes", "<p>Shared</p>"),
        Content::html("c-appendix", "", "<p>Appendix</p>"),
    ])
}

fn anchors_for(mesh: &Mesh) -> AnchorMap {
    assign_anchors(&mesh.flatten())
}

/// Positions of `needles` in `haystack`, panicking if one is missing
fn positions(haystack: &str, needles: &[&str]) -> Vec<usize> {
    needles
        .iter()
        .map(|needle| {
            haystack
                .find(needle)
                .unwrap_or_else(|| panic!("'{}' not found in:\n{}", needle, haystack))
        })
        .collect()
}

fn is_ascending(values: &[usize]) -> bool {
    values.windows(2).all(|pair| pair[0] < pair[1])
}

fn read_archive(bytes: Vec<u8>) -> zip::ZipArchive<Cursor<Vec<u8>>> {
    zip::ZipArchive::new(Cursor::new(bytes)).unwrap()
}

fn entry_names(archive: &mut zip::ZipArchive<Cursor<Vec<u8>>>) -> Vec<String> {
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

fn entry_body(archive: &mut zip::ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
    let mut body = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut body)
        .unwrap();
    body
}

mod navigation_tests {
    use super::*;

    #[test]
    fn test_entries_follow_flatten_order() {
        let mesh = handbook();
        let nav = build_navigation(&mesh, &anchors_for(&mesh), &contents());

        let found = positions(
            &nav,
            &[
                r##"href="#node-intro""##,
                r##"href="#node-setup""##,
                r##"href="#node-faq""##,
                r##"href="#node-usage""##,
                r##"href="#node-appendix""##,
            ],
        );
        assert!(is_ascending(&found));
    }

    #[test]
    fn test_labels_fall_back_to_content_name_then_id() {
        let mesh = handbook();
        let nav = build_navigation(&mesh, &anchors_for(&mesh), &contents());

        assert!(nav.contains(">Introduction</a>"));
        assert!(nav.contains(">Setup Guide</a>"));
        assert!(nav.contains(">c-appendix</a>"));
    }

    #[test]
    fn test_descriptions_and_preferred_root() {
        let mesh = handbook();
        let nav = build_navigation(&mesh, &anchors_for(&mesh), &contents());

        assert!(nav.contains(r#"<p class="mesh-nav-description">Start here</p>"#));
        assert_eq!(nav.matches(r#"<li class="mesh-nav-item preferred">"#).count(), 1);
        assert_eq!(nav.matches("<li ").count(), 5);
        assert_eq!(nav.matches("<ul ").count(), nav.matches("</ul>").count());
    }

    #[test]
    fn test_nested_lists_mirror_structure() {
        let mesh = handbook();
        let nav = build_navigation(&mesh, &anchors_for(&mesh), &contents());

        // root list, intro's children, setup's children
        assert_eq!(nav.matches(r#"<ul class="mesh-nav-list">"#).count(), 3);
    }

    #[test]
    fn test_labels_are_escaped() {
        let mesh = Mesh::new("m");
        let (mesh, _) = mesh
            .add_node(NewNode::new("c-intro").with_title("<b>Bold</b> & co"))
            .unwrap();
        let nav = build_navigation(&mesh, &anchors_for(&mesh), &contents());

        assert!(nav.contains("&lt;b&gt;Bold&lt;/b&gt; &amp; co"));
        assert!(!nav.contains("<b>"));
    }

    #[test]
    fn test_empty_mesh_renders_nothing() {
        let mesh = Mesh::new("empty");
        assert_eq!(build_navigation(&mesh, &anchors_for(&mesh), &contents()), "");
    }
}

mod stitch_tests {
    use super::*;

    #[test]
    fn test_sections_in_flatten_order_with_anchor_ids() {
        let mesh = handbook();
        let nodes = mesh.flatten();
        let anchors = assign_anchors(&nodes);
        let stitched = stitch_content(&nodes, &contents(), &anchors).unwrap();

        let found = positions(
            &stitched,
            &[
                r#"<section id="node-intro""#,
                r#"<section id="node-setup""#,
                r#"<section id="node-faq""#,
                r#"<section id="node-usage""#,
                r#"<section id="node-appendix""#,
            ],
        );
        assert!(is_ascending(&found));
        assert_eq!(stitched.matches("<p>Shared</p>").count(), 2);
    }

    #[test]
    fn test_document_wrapper_is_stripped() {
        let mesh = handbook();
        let nodes = mesh.flatten();
        let stitched = stitch_content(&nodes, &contents(), &assign_anchors(&nodes)).unwrap();

        assert!(stitched.contains("<h1>Intro</h1>"));
        assert!(!stitched.contains("<!DOCTYPE"));
        assert!(!stitched.contains("<head>"));
        assert!(!stitched.contains("<body>"));
    }

    #[test]
    fn test_description_precedes_body() {
        let mesh = handbook();
        let nodes = mesh.flatten();
        let stitched = stitch_content(&nodes, &contents(), &assign_anchors(&nodes)).unwrap();

        let found = positions(
            &stitched,
            &[
                r#"<section id="node-intro""#,
                r#"<p class="mesh-section-description">Start here</p>"#,
                "<h1>Intro</h1>",
            ],
        );
        assert!(is_ascending(&found));
    }

    #[test]
    fn test_missing_content_fails_whole_stitch() {
        let mesh = handbook();
        let nodes = mesh.flatten();
        let mut store = contents();
        store.remove("c-shared");

        let err = stitch_content(&nodes, &store, &assign_anchors(&nodes)).unwrap_err();
        assert_eq!(err, MeshError::content_not_found("faq", "c-shared"));
    }

    #[test]
    fn test_find_dangling_content() {
        let mesh = handbook();
        let mut store = contents();
        assert!(find_dangling_content(&mesh, &store).is_empty());

        store.remove("c-shared");
        assert_eq!(
            find_dangling_content(&mesh, &store),
            vec![
                ("faq".to_string(), "c-shared".to_string()),
                ("usage".to_string(), "c-shared".to_string()),
            ]
        );
    }
}

mod document_tests {
    use super::*;

    #[test]
    fn test_complete_standalone_document() {
        let doc = generate_index_document(&handbook(), &contents(), &ExportSettings::default())
            .unwrap();

        assert!(doc.starts_with("<!DOCTYPE html>\n"));
        assert!(doc.ends_with("</html>\n"));
        assert!(doc.contains("<title>Handbook</title>"));
        assert!(doc.contains("--mesh-bg: #ffffff;"));
        assert!(doc.contains(r#"<nav class="mesh-nav" aria-label="Contents">"#));
        assert!(doc.contains(r#"<main class="mesh-content">"#));
    }

    #[test]
    fn test_every_navigation_link_has_a_section() {
        let doc = generate_index_document(&handbook(), &contents(), &ExportSettings::default())
            .unwrap();

        let href = Regex::new(r##"href="#([^"]+)""##).unwrap();
        let targets: Vec<&str> = href
            .captures_iter(&doc)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();
        assert_eq!(targets.len(), 5);
        for target in targets {
            assert!(
                doc.contains(&format!(r#"<section id="{}""#, target)),
                "no section for #{}",
                target
            );
        }
    }

    #[test]
    fn test_settings_title_theme_and_descriptions() {
        let mut settings = ExportSettings::default()
            .with_title("User Guide")
            .with_theme(Theme::dark());
        settings.include_descriptions = false;

        let doc = generate_index_document(&handbook(), &contents(), &settings).unwrap();
        assert!(doc.contains("<title>User Guide</title>"));
        assert!(doc.contains("--mesh-bg: #0d1117;"));
        assert!(!doc.contains("Start here"));
        assert!(!doc.contains("Day to day"));
    }

    #[test]
    fn test_empty_mesh_yields_empty_document() {
        let doc =
            generate_index_document(&Mesh::new("Empty"), &contents(), &ExportSettings::default())
                .unwrap();

        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<nav class=\"mesh-nav\" aria-label=\"Contents\">\n    </nav>"));
        assert!(doc.contains("<main class=\"mesh-content\">\n    </main>"));
        assert!(!doc.contains("<section"));
    }

    #[test]
    fn test_invalid_mesh_is_refused() {
        let mut nodes = NodeMap::new();
        nodes.insert(
            "lost".to_string(),
            Arc::new(MeshNode {
                id: "lost".to_string(),
                content_id: "c-intro".to_string(),
                title: String::new(),
                description: String::new(),
                parent_id: Some("ghost".to_string()),
                children: Vec::new(),
                order: 0,
            }),
        );
        let now = Utc::now();
        let mesh = Mesh::from_parts("bad".into(), "Bad".into(), nodes, None, now, now);

        let err =
            generate_index_document(&mesh, &contents(), &ExportSettings::default()).unwrap_err();
        assert!(matches!(err, MeshError::MeshValidationFailed { ref mesh_id, .. } if mesh_id == "bad"));

        let err = export_to_archive(&mesh, &contents(), &ExportSettings::default()).unwrap_err();
        assert!(matches!(err, MeshError::MeshValidationFailed { .. }));
    }
}

mod archive_tests {
    use super::*;

    #[test]
    fn test_index_first_then_distinct_contents() {
        let bytes = export_to_archive(&handbook(), &contents(), &ExportSettings::default()).unwrap();
        let mut archive = read_archive(bytes);

        assert_eq!(
            entry_names(&mut archive),
            vec![
                "index.html",
                "Intro.html",
                "Setup_Guide.html",
                "Shared_Notes.html",
                "untitled.html",
            ]
        );
    }

    #[test]
    fn test_entries_hold_index_and_raw_payloads() {
        let settings = ExportSettings::default();
        let expected_index = generate_index_document(&handbook(), &contents(), &settings).unwrap();
        let bytes = export_to_archive(&handbook(), &contents(), &settings).unwrap();
        let mut archive = read_archive(bytes);

        assert_eq!(entry_body(&mut archive, "index.html"), expected_index);
        assert_eq!(entry_body(&mut archive, "Shared_Notes.html"), "<p>Shared</p>");
        assert!(entry_body(&mut archive, "Intro.html").starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_colliding_names_are_suffixed() {
        let mesh = Mesh::new("m");
        let (mesh, _) = mesh.add_node(NewNode::new("one")).unwrap();
        let (mesh, _) = mesh.add_node(NewNode::new("two")).unwrap();
        let (mesh, _) = mesh.add_node(NewNode::new("three")).unwrap();
        let store = InMemoryContentStore::with_contents([
            Content::html("one", "index", "1"),
            Content::html("two", "Notes", "2"),
            Content::html("three", "notes", "3"),
        ]);

        let bytes = export_to_archive(&mesh, &store, &ExportSettings::default()).unwrap();
        let mut archive = read_archive(bytes);
        assert_eq!(
            entry_names(&mut archive),
            vec!["index.html", "index-1.html", "Notes.html", "notes-1.html"]
        );
        assert_eq!(entry_body(&mut archive, "notes-1.html"), "3");
    }

    #[test]
    fn test_custom_index_name_is_sanitised() {
        let settings = ExportSettings {
            index_file_name: "My Book.html".to_string(),
            ..ExportSettings::default()
        };
        let bytes = export_to_archive(&handbook(), &contents(), &settings).unwrap();
        let mut archive = read_archive(bytes);
        assert_eq!(entry_names(&mut archive)[0], "My_Book.html");
    }

    #[test]
    fn test_empty_mesh_archive_holds_only_index() {
        let bytes =
            export_to_archive(&Mesh::new("Empty"), &contents(), &ExportSettings::default()).unwrap();
        let mut archive = read_archive(bytes);

        assert_eq!(entry_names(&mut archive), vec!["index.html"]);
        assert!(entry_body(&mut archive, "index.html").contains("<title>Empty</title>"));
    }

    #[test]
    fn test_missing_content_aborts_archive() {
        let mut store = contents();
        store.remove("c-setup");

        let err = export_to_archive(&handbook(), &store, &ExportSettings::default()).unwrap_err();
        assert_eq!(err, MeshError::content_not_found("setup", "c-setup"));
    }
}

mod async_export_tests {
    use super::*;

    /// Source that cancels the token as soon as it serves its first item
    struct CancellingSource {
        inner: InMemoryContentStore,
        token: CancellationToken,
    }

    #[async_trait]
    impl ContentSource for CancellingSource {
        async fn fetch(&self, content_id: &str) -> Option<Content> {
            self.token.cancel();
            ContentLookup::get(&self.inner, content_id).cloned()
        }
    }

    #[tokio::test]
    async fn test_async_export_matches_sync_entries() {
        let cancel = CancellationToken::new();
        let bytes = export_archive_async(
            &handbook(),
            &contents(),
            &ExportSettings::default(),
            &cancel,
        )
        .await
        .unwrap();
        let mut archive = read_archive(bytes);

        assert_eq!(archive.len(), 5);
        assert_eq!(entry_names(&mut archive)[0], "index.html");
        assert_eq!(entry_body(&mut archive, "Setup_Guide.html"), "<p>Install and run</p>");
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = export_archive_async(&handbook(), &contents(), &ExportSettings::default(), &cancel)
            .await
            .unwrap_err();
        assert_eq!(err, MeshError::ExportCancelled);
    }

    #[tokio::test]
    async fn test_cancelled_during_content_resolution() {
        let token = CancellationToken::new();
        let source = CancellingSource {
            inner: contents(),
            token: token.clone(),
        };

        let err = export_archive_async(&handbook(), &source, &ExportSettings::default(), &token)
            .await
            .unwrap_err();
        assert_eq!(err, MeshError::ExportCancelled);
    }

    #[tokio::test]
    async fn test_async_missing_content() {
        let mut store = contents();
        store.remove("c-appendix");

        let err = export_archive_async(
            &handbook(),
            &store,
            &ExportSettings::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert_eq!(err, MeshError::content_not_found("appendix", "c-appendix"));
    }
}
