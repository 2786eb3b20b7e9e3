// ABOUTME: DOM parsing and traversal utilities shared by the locator, metadata extractor and sanitizer.
// ABOUTME: Provides lenient parsing, visible-text measurement and a skip-set serializer.

//! DOM utilities.
//!
//! Parsing never fails: html5ever recovers from malformed markup and the
//! recovered errors stay on the returned [`Html`] instead of being reported.

pub mod serialize;

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::trace;

use crate::sanitize::is_disallowed_tag;

/// Parse a full document, tolerating any malformed markup.
///
/// Input is already a Rust string, so the content is UTF-8 whatever charset
/// the page declares; `<meta charset>` in the markup has no effect here.
pub fn parse_lenient(html: &str) -> Html {
    let doc = Html::parse_document(html);
    if !doc.errors.is_empty() {
        trace!(count = doc.errors.len(), "suppressed html parse errors");
    }
    doc
}

/// The first `<body>` element of a document, if any.
pub fn body_element(doc: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse("body").ok()?;
    doc.select(&selector).next()
}

/// Serialized outer HTML of the document body, or an empty string.
pub fn body_html(doc: &Html) -> String {
    body_element(doc).map(|b| b.html()).unwrap_or_default()
}

/// Collapses runs of whitespace to single spaces and trims the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text a reader would see inside `element`, whitespace-collapsed.
///
/// Adjacent text nodes are concatenated as-is, like DOM `textContent`.
///
/// Text under tags the sanitizer drops (script, style, ...) is not counted.
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(*element, &mut raw);
    normalize_whitespace(&raw)
}

/// Character count (not bytes) of [`visible_text`].
pub fn visible_text_len(element: ElementRef<'_>) -> usize {
    visible_text(element).chars().count()
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(t) => {
            out.push_str(&**t);
        }
        Node::Element(el) if is_disallowed_tag(el.name()) => {}
        Node::Element(_) | Node::Document | Node::Fragment => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
        _ => {}
    }
}
