//! Rendering the acknowledgement into a page
//!
//! The resolver only needs to set the inner HTML of one element by id. The
//! [`Document`] trait captures that, and [`HtmlDocument`] implements it over a
//! plain HTML string so static pages can be rendered from the command line.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use regex::{Captures, Regex};
use thiserror::Error;

/// Id of the element that receives the acknowledgement
pub const SUPPORT_ACK_ID: &str = "support-ack-url";

/// Elements that can never hold content
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Errors reading or writing page files
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Failed to read page {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write page {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Builds the acknowledgement fragment for `label`
pub fn ack_message(label: &str) -> String {
    format!(
        "We gratefully acknowledge support from<br/>the Simons Foundation and {}.",
        label
    )
}

/// A page whose elements can be addressed by id
pub trait Document {
    /// Replaces the content of the element with `id`
    ///
    /// Returns false, leaving the page untouched, if no such element exists.
    fn set_inner_html(&mut self, id: &str, html: &str) -> bool;
}

/// An HTML page held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlDocument {
    html: String,
}

impl HtmlDocument {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// Reads a page from disk
    pub fn load(path: &Path) -> Result<Self, PageError> {
        fs::read_to_string(path)
            .map(Self::new)
            .map_err(|source| PageError::Read {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Writes the page to disk
    pub fn save(&self, path: &Path) -> Result<(), PageError> {
        fs::write(path, &self.html).map_err(|source| PageError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    /// Current inner HTML of the element with `id`, if it exists
    pub fn inner_html(&self, id: &str) -> Option<&str> {
        let span = self.content_span(id)?;
        Some(&self.html[span])
    }

    /// Byte range between the element's start tag and its matching end tag
    fn content_span(&self, id: &str) -> Option<Range<usize>> {
        // Comments are blanked to spaces so offsets still index `self.html`
        let comments = Regex::new(r"(?s)<!--.*?(?:-->|\z)").ok()?;
        let masked = comments.replace_all(&self.html, |caps: &Captures| {
            " ".repeat(caps[0].len())
        });

        let open_pattern = format!(
            concat!(
                r#"(?i)<([a-z][a-z0-9-]*)(?:\s[^>]*?)?"#,
                r#"\sid\s*=\s*(?:"{id}"|'{id}'|{id})(?:\s[^>]*?)?(/?)>"#,
            ),
            id = regex::escape(id)
        );
        let open = Regex::new(&open_pattern).ok()?;
        let caps = open.captures(&masked)?;

        let tag = caps.get(1)?.as_str().to_ascii_lowercase();
        let self_closing = caps.get(2).is_some_and(|m| !m.as_str().is_empty());
        if self_closing || VOID_ELEMENTS.contains(&tag.as_str()) {
            tracing::debug!(id, tag = %tag, "element cannot hold content");
            return None;
        }

        let start = caps.get(0)?.end();
        let tags = Regex::new(&format!(
            r"(?i)<(/?){}(?:\s[^>]*?)?(/?)>",
            regex::escape(&tag)
        ))
        .ok()?;

        let mut depth = 1usize;
        for m in tags.captures_iter(&masked[start..]) {
            let closing = m.get(1).is_some_and(|c| !c.as_str().is_empty());
            let self_closed = m.get(2).is_some_and(|c| !c.as_str().is_empty());
            if closing {
                depth -= 1;
                if depth == 0 {
                    let end = start + m.get(0)?.start();
                    return Some(start..end);
                }
            } else if !self_closed {
                depth += 1;
            }
        }

        tracing::debug!(id, tag = %tag, "element has no end tag");
        None
    }
}

impl Document for HtmlDocument {
    fn set_inner_html(&mut self, id: &str, html: &str) -> bool {
        match self.content_span(id) {
            Some(span) => {
                self.html.replace_range(span, html);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
<footer>
  <p id="support-ack-url" class="small">Loading...</p>
</footer>
</body></html>"#;

    #[test]
    fn test_ack_message_format() {
        assert_eq!(
            ack_message("Example University"),
            "We gratefully acknowledge support from<br/>the Simons Foundation and Example University."
        );
    }

    #[test]
    fn test_set_inner_html_replaces_content() {
        let mut doc = HtmlDocument::new(PAGE);

        assert!(doc.set_inner_html(SUPPORT_ACK_ID, "hello"));

        assert_eq!(doc.inner_html(SUPPORT_ACK_ID), Some("hello"));
        assert!(doc
            .as_str()
            .contains(r#"<p id="support-ack-url" class="small">hello</p>"#));
    }

    #[test]
    fn test_missing_element_is_untouched() {
        let mut doc = HtmlDocument::new("<html><body><p id=\"other\">x</p></body></html>");
        let before = doc.clone();

        assert!(!doc.set_inner_html(SUPPORT_ACK_ID, "hello"));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_id_must_match_exactly() {
        let doc = HtmlDocument::new(r#"<div id="support-ack-url-old">a</div>"#);
        assert!(doc.inner_html(SUPPORT_ACK_ID).is_none());

        let doc = HtmlDocument::new(r#"<div data-id="support-ack-url">a</div>"#);
        assert!(doc.inner_html(SUPPORT_ACK_ID).is_none());
    }

    #[test]
    fn test_single_quoted_id_and_uppercase_tag() {
        let mut doc = HtmlDocument::new("<DIV id='support-ack-url'>old</DIV>");
        assert!(doc.set_inner_html(SUPPORT_ACK_ID, "new"));
        assert_eq!(doc.as_str(), "<DIV id='support-ack-url'>new</DIV>");
    }

    #[test]
    fn test_nested_same_tag_is_honoured() {
        let mut doc = HtmlDocument::new(
            r#"<div id="support-ack-url"><div>inner</div>tail</div><div>after</div>"#,
        );

        assert!(doc.set_inner_html(SUPPORT_ACK_ID, "x"));

        assert_eq!(
            doc.as_str(),
            r#"<div id="support-ack-url">x</div><div>after</div>"#
        );
    }

    #[test]
    fn test_unquoted_id_is_found() {
        let mut doc = HtmlDocument::new("<p id=support-ack-url>old</p>");
        assert!(doc.set_inner_html(SUPPORT_ACK_ID, "new"));
        assert_eq!(doc.as_str(), "<p id=support-ack-url>new</p>");

        let doc = HtmlDocument::new("<p class=small id=support-ack-url-old>old</p>");
        assert!(doc.inner_html(SUPPORT_ACK_ID).is_none());
    }

    #[test]
    fn test_commented_out_element_is_skipped() {
        let mut doc = HtmlDocument::new(
            r#"<!-- <p id="support-ack-url">x</p> --><p id="support-ack-url">old</p>"#,
        );

        assert!(doc.set_inner_html(SUPPORT_ACK_ID, "new"));

        assert_eq!(
            doc.as_str(),
            r#"<!-- <p id="support-ack-url">x</p> --><p id="support-ack-url">new</p>"#
        );
    }

    #[test]
    fn test_end_tag_inside_comment_is_ignored() {
        let mut doc = HtmlDocument::new(r#"<div id="support-ack-url"><!-- </div> -->a</div>"#);
        assert!(doc.set_inner_html(SUPPORT_ACK_ID, "b"));
        assert_eq!(doc.as_str(), r#"<div id="support-ack-url">b</div>"#);
    }

    #[test]
    fn test_custom_element_with_shared_prefix_does_not_nest() {
        let mut doc = HtmlDocument::new(
            r#"<p id="support-ack-url"><p-card>card</p-card> tail</p><p>after</p>"#,
        );

        assert!(doc.set_inner_html(SUPPORT_ACK_ID, "x"));

        assert_eq!(doc.as_str(), r#"<p id="support-ack-url">x</p><p>after</p>"#);
    }

    #[test]
    fn test_load_and_save_roundtrip_through_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("index.html");
        fs::write(&path, PAGE).unwrap();

        let mut doc = HtmlDocument::load(&path).unwrap();
        doc.set_inner_html(SUPPORT_ACK_ID, "saved");
        doc.save(&path).unwrap();

        let reloaded = HtmlDocument::load(&path).unwrap();
        assert_eq!(reloaded.inner_html(SUPPORT_ACK_ID), Some("saved"));
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = HtmlDocument::load(&dir.path().join("missing.html")).unwrap_err();
        assert!(matches!(err, PageError::Read { .. }));
        assert!(err.to_string().contains("missing.html"));
    }

    #[test]
    fn test_void_and_unclosed_elements_are_not_updated() {
        let mut doc = HtmlDocument::new(r#"<img id="support-ack-url" src="a.png">"#);
        assert!(!doc.set_inner_html(SUPPORT_ACK_ID, "x"));

        let mut doc = HtmlDocument::new(r#"<span id="support-ack-url"/>"#);
        assert!(!doc.set_inner_html(SUPPORT_ACK_ID, "x"));

        let mut doc = HtmlDocument::new(r#"<p id="support-ack-url">never closed"#);
        assert!(!doc.set_inner_html(SUPPORT_ACK_ID, "x"));
    }
}
