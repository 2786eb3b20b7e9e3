// ABOUTME: HTML serializer that omits a skip set of nodes and filters attributes.
// ABOUTME: Escapes text and attribute values so the output re-parses to the same tree.

use std::collections::HashSet;

use ego_tree::{NodeId, NodeRef};
use scraper::node::Element;
use scraper::Node;

/// What to do with one attribute during serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrDecision {
    Keep,
    Drop,
    Replace(String),
}

/// HTML elements whose text children are emitted without escaping.
const RAW_TEXT_TAGS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// How text children of an element are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextMode {
    Escaped,
    Raw,
    /// `<noscript>` text is markup to a parser with scripting disabled.
    Dropped,
}

/// Raw-text handling only applies to HTML-namespace elements; an `xmp`
/// inside `<svg>` or `<math>` holds entity-decoded text that must be escaped.
fn text_mode(el: &Element) -> TextMode {
    if &*el.name.ns != HTML_NAMESPACE {
        return TextMode::Escaped;
    }
    let name = el.name();
    if name == "noscript" {
        TextMode::Dropped
    } else if RAW_TEXT_TAGS.contains(&name) {
        TextMode::Raw
    } else {
        TextMode::Escaped
    }
}

/// Serialize the children of `parent`, leaving out every node in `skip`
/// together with its subtree. Each attribute goes through `decide(name, value)`.
pub fn serialize_children<F>(
    parent: NodeRef<'_, Node>,
    skip: &HashSet<NodeId>,
    decide: F,
) -> String
where
    F: Fn(&str, &str) -> AttrDecision,
{
    let mode = match parent.value() {
        Node::Element(el) => text_mode(el),
        _ => TextMode::Escaped,
    };
    let mut out = String::new();
    for child in parent.children() {
        serialize_node(child, skip, &decide, mode, &mut out);
    }
    out
}

fn serialize_node<F>(
    node: NodeRef<'_, Node>,
    skip: &HashSet<NodeId>,
    decide: &F,
    text: TextMode,
    out: &mut String,
) where
    F: Fn(&str, &str) -> AttrDecision,
{
    if skip.contains(&node.id()) {
        return;
    }
    match node.value() {
        Node::Text(t) => match text {
            TextMode::Escaped => out.push_str(&escape_text(&**t)),
            TextMode::Raw => out.push_str(&**t),
            TextMode::Dropped => {}
        },
        Node::Element(el) => {
            let name = el.name();
            out.push('<');
            out.push_str(name);

            for (k, v) in el.attrs() {
                let value = match decide(k, v) {
                    AttrDecision::Keep => escape_attr(v),
                    AttrDecision::Drop => continue,
                    AttrDecision::Replace(new) => escape_attr(&new),
                };
                out.push(' ');
                out.push_str(k);
                out.push_str("=\"");
                out.push_str(&value);
                out.push('"');
            }

            if is_void_element(name) {
                out.push_str(" />");
                return;
            }

            out.push('>');
            let mode = text_mode(el);
            for child in node.children() {
                serialize_node(child, skip, decide, mode, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        Node::Comment(c) => {
            out.push_str("<!--");
            out.push_str(&**c);
            out.push_str("-->");
        }
        _ => {}
    }
}

/// Escape a text node
fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('\u{a0}', "&nbsp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape attribute value
fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('\u{a0}', "&nbsp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Check if tag is void element
fn is_void_element(tag: &str) -> bool {
    matches!(
        tag.to_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn body_of(doc: &Html) -> NodeRef<'_, Node> {
        let sel = Selector::parse("body").unwrap();
        *doc.select(&sel).next().unwrap()
    }

    fn keep_all(doc: &Html) -> String {
        serialize_children(body_of(doc), &HashSet::new(), |_, _| AttrDecision::Keep)
    }

    #[test]
    fn escapes_decoded_entities() {
        let doc = Html::parse_document("<p title=\"a&quot;b\">1 &lt; 2 &amp;&amp; x&nbsp;y</p>");
        let out = keep_all(&doc);
        assert_eq!(out, "<p title=\"a&quot;b\">1 &lt; 2 &amp;&amp; x&nbsp;y</p>");
    }

    #[test]
    fn skips_subtrees_in_skip_set() {
        let doc = Html::parse_document("<div><section><p>gone</p></section><p>kept</p></div>");
        let sel = Selector::parse("section").unwrap();
        let skip: HashSet<NodeId> = doc.select(&sel).map(|el| el.id()).collect();

        let out = serialize_children(body_of(&doc), &skip, |_, _| AttrDecision::Keep);
        assert_eq!(out, "<div><p>kept</p></div>");
    }

    #[test]
    fn filters_attributes() {
        let doc = Html::parse_document("<a href=\"/x\" class=\"c\" data-k=\"v\">x</a><br>");
        let out = serialize_children(body_of(&doc), &HashSet::new(), |k, _| {
            if k == "class" {
                AttrDecision::Drop
            } else {
                AttrDecision::Keep
            }
        });
        assert!(out.contains("href=\"/x\""), "got: {}", out);
        assert!(out.contains("data-k=\"v\""), "got: {}", out);
        assert!(!out.contains("class"), "got: {}", out);
        assert!(out.ends_with(">x</a><br />"), "got: {}", out);
    }

    #[test]
    fn replaces_attribute_values() {
        let doc = Html::parse_document("<img src=\"a.png\">");
        let out = serialize_children(body_of(&doc), &HashSet::new(), |_, v| {
            AttrDecision::Replace(format!("/static/{}", v))
        });
        assert_eq!(out, "<img src=\"/static/a.png\" />");
    }

    #[test]
    fn raw_text_children_are_not_escaped() {
        let doc = Html::parse_document("<xmp>a < b && c</xmp>");
        let out = keep_all(&doc);
        assert_eq!(out, "<xmp>a < b && c</xmp>");
    }

    #[test]
    fn foreign_raw_text_names_are_escaped() {
        let doc = Html::parse_document(
            "<svg><xmp>&lt;b&gt;</xmp></svg><math><noembed>a&amp;b</noembed></math>",
        );
        let out = keep_all(&doc);
        assert_eq!(
            out,
            "<svg><xmp>&lt;b&gt;</xmp></svg><math><noembed>a&amp;b</noembed></math>"
        );
    }

    #[test]
    fn noscript_text_is_dropped() {
        let doc = Html::parse_document("<p>x</p><noscript><img src=x onerror=alert(1)></noscript>");
        let out = keep_all(&doc);
        assert_eq!(out, "<p>x</p><noscript></noscript>");
    }

    #[test]
    fn output_round_trips() {
        let input = "<ul><li>one &amp; two</li><li><img src=\"a.png\" alt=\"&lt;x&gt;\" /></li></ul>";
        let first_doc = Html::parse_document(input);
        let first = keep_all(&first_doc);
        let second_doc = Html::parse_document(&first);
        let second = keep_all(&second_doc);
        assert_eq!(first, second);
    }
}
