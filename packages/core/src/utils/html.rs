//! HTML helpers for the export engine
//!
//! Escaping, document-wrapper stripping, anchor and file-name sanitising, and
//! a small indenting buffer used to emit markup.

use regex::Regex;
use std::sync::LazyLock;

/// Captures everything between `<body ...>` and `</body>`
static BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body\b[^>]*>(.*)</body\s*>").expect("valid body regex"));

/// Document-level wrapper tags to drop when a payload has no `<body>`
static WRAPPER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!doctype[^>]*>|</?html\b[^>]*>|<head\b[^>]*>.*?</head\s*>")
        .expect("valid wrapper regex")
});

/// Characters that are not safe in an archive entry name
static UNSAFE_FILE_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid file name regex"));

/// Characters that are not safe in an anchor token
static UNSAFE_ANCHOR_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("valid anchor regex"));

/// Escape text for use in element content or a quoted attribute
///
/// # Examples
///
/// ```
/// use docmesh_core::utils::escape_html;
///
/// assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
/// ```
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Return the inner body of an HTML payload
///
/// Full documents yield the content of their `<body>` element. Fragments
/// are returned with any stray doctype, `<html>` or `<head>` wrapper removed.
pub fn extract_body(html: &str) -> String {
    if let Some(captures) = BODY_RE.captures(html) {
        if let Some(inner) = captures.get(1) {
            return inner.as_str().trim().to_string();
        }
    }
    WRAPPER_RE.replace_all(html, "").trim().to_string()
}

/// Make a name safe for an archive entry
///
/// Every character other than ASCII letters, digits, `.`, `_` and `-` is
/// replaced with `_`. An empty result becomes `"untitled"`.
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized = UNSAFE_FILE_CHARS_RE.replace_all(name.trim(), "_").to_string();
    if sanitized.is_empty() {
        "untitled".to_string()
    } else {
        sanitized
    }
}

/// Turn an arbitrary id into a token usable as an element id
pub fn sanitize_anchor(raw: &str) -> String {
    let token = UNSAFE_ANCHOR_CHARS_RE.replace_all(raw, "-");
    token.trim_matches('-').to_lowercase()
}

/// Indenting string buffer for emitting markup line by line
pub struct HtmlBuffer {
    buffer: String,
    depth: usize,
    indent: &'static str,
}

impl HtmlBuffer {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            depth: 0,
            indent: "  ",
        }
    }

    /// Append an indented line
    pub fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.buffer.push_str(self.indent);
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    /// Append a line and indent everything after it
    pub fn open(&mut self, text: &str) {
        self.line(text);
        self.depth += 1;
    }

    /// Outdent, then append a line
    pub fn close(&mut self, text: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
    }

    /// Append pre-rendered markup untouched
    ///
    /// No indentation is added, so whitespace-sensitive content such as
    /// `<pre>` blocks survives unchanged.
    pub fn raw(&mut self, markup: &str) {
        if markup.is_empty() {
            return;
        }
        self.buffer.push_str(markup);
        if !markup.ends_with('\n') {
            self.buffer.push('\n');
        }
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}

impl Default for HtmlBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Tom & Jerry"), "Tom &amp; Jerry");
        assert_eq!(escape_html("it's"), "it&#39;s");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_extract_body_from_full_document() {
        let html = "<!DOCTYPE html>\n<html><head><title>T</title></head>\n<BODY class=\"x\">\n<p>Hi</p>\n</BODY></html>";
        assert_eq!(extract_body(html), "<p>Hi</p>");
    }

    #[test]
    fn test_extract_body_keeps_fragment() {
        assert_eq!(extract_body("  <h1>Title</h1><p>x</p> "), "<h1>Title</h1><p>x</p>");
    }

    #[test]
    fn test_extract_body_strips_wrapper_without_body() {
        let html = "<html><head><style>p{}</style></head><p>x</p></html>";
        assert_eq!(extract_body(html), "<p>x</p>");
    }

    #[test]
    fn test_body_like_tag_names_are_not_body() {
        assert_eq!(extract_body("<bodyguard>x</bodyguard>"), "<bodyguard>x</bodyguard>");
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("My Notes (v2).html"), "My_Notes__v2_.html");
        assert_eq!(sanitize_file_name("ok_name-1.htm"), "ok_name-1.htm");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name("   "), "untitled");
    }

    #[test]
    fn test_sanitize_anchor() {
        assert_eq!(sanitize_anchor("ABC 123/x"), "abc-123-x");
        assert_eq!(sanitize_anchor("--weird--"), "weird");
        assert_eq!(sanitize_anchor("***"), "");
    }

    #[test]
    fn test_html_buffer_indents_nested_lines() {
        let mut buf = HtmlBuffer::new();
        buf.open("<ul>");
        buf.line("<li>a</li>");
        buf.close("</ul>");
        assert_eq!(buf.finish(), "<ul>\n  <li>a</li>\n</ul>\n");
    }

    #[test]
    fn test_html_buffer_raw_is_not_indented() {
        let mut buf = HtmlBuffer::new();
        buf.open("<div>");
        buf.raw("<pre>\n  keep\n</pre>");
        buf.close("</div>");
        assert_eq!(buf.finish(), "<div>\n<pre>\n  keep\n</pre>\n</div>\n");
    }
}
