// ABOUTME: HTML sanitizer applied to located content before it is stored or displayed.
// ABOUTME: Removes dangerous tags with their subtree, inline event handlers and javascript: URLs.

//! HTML sanitization.
//!
//! The default [`SanitizePolicy::Compatible`] policy removes known-dangerous
//! constructs and leaves all other markup untouched:
//!
//! - elements named in [`DISALLOWED_TAGS`] are dropped together with their
//!   whole subtree, including nested occurrences;
//! - any attribute whose name starts with `on` (case-insensitive) is dropped,
//!   the element itself is kept;
//! - `href`/`src` attributes holding a `javascript:` URL are dropped.
//!
//! [`SanitizePolicy::Strict`] instead runs an ammonia allow-list: unknown
//! tags are unwrapped (children kept), disallowed tags lose their subtree and
//! only http/https/mailto URLs survive.
//!
//! Both policies are idempotent: sanitizing the output again yields the same
//! string.

use std::collections::HashSet;

use ego_tree::NodeId;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Node;
use url::Url;

use crate::dom::parse_lenient;
use crate::dom::serialize::{serialize_children, AttrDecision};
use crate::options::SanitizePolicy;

/// Tags removed with their entire subtree, under every policy.
pub const DISALLOWED_TAGS: &[&str] = &[
    "script", "iframe", "object", "embed", "form", "input", "button", "link", "meta", "style",
];

/// Tags kept by the strict policy; everything else not disallowed is unwrapped.
const STRICT_ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "caption", "code", "dd", "del", "div", "dl", "dt",
    "em", "figcaption", "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i", "img", "ins",
    "li", "ol", "p", "pre", "s", "small", "strong", "sub", "sup", "table", "tbody", "td",
    "tfoot", "th", "thead", "tr", "u", "ul",
];

static JAVASCRIPT_URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*javascript:").unwrap());

/// Options for a single sanitize call.
#[derive(Debug, Clone, Default)]
pub struct SanitizeOptions {
    pub policy: SanitizePolicy,
    /// When set, relative `href`/`src` values are resolved against this URL.
    pub base_url: Option<Url>,
}

/// Returns true for tag names that are removed with their subtree.
pub fn is_disallowed_tag(name: &str) -> bool {
    DISALLOWED_TAGS.iter().any(|t| t.eq_ignore_ascii_case(name))
}

/// Returns true for inline event handler attributes (`onclick`, `OnLoad`, ...).
pub fn is_event_handler_attr(name: &str) -> bool {
    name.get(..2)
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case("on"))
}

/// Returns true if `value` is a `javascript:` URL.
///
/// Leading whitespace is ignored, as are tabs and newlines anywhere in the
/// value since browsers strip them before resolving the scheme.
pub fn is_javascript_url(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect();
    JAVASCRIPT_URL_RE.is_match(&compact)
}

fn is_url_attr(name: &str) -> bool {
    name.eq_ignore_ascii_case("href") || name.eq_ignore_ascii_case("src")
}

/// Sanitize `html` with the default compatible policy.
pub fn sanitize(html: &str) -> String {
    sanitize_with(html, &SanitizeOptions::default())
}

/// Sanitize `html` according to `opts`.
pub fn sanitize_with(html: &str, opts: &SanitizeOptions) -> String {
    match opts.policy {
        SanitizePolicy::Compatible => sanitize_compatible(html, opts.base_url.as_ref()),
        SanitizePolicy::Strict => sanitize_strict(html, opts.base_url.as_ref()),
    }
}

fn sanitize_compatible(html: &str, base_url: Option<&Url>) -> String {
    let doc = parse_lenient(html);

    // Ids are collected before serialization, so nested matches cannot be missed.
    let skip: HashSet<NodeId> = doc
        .tree
        .root()
        .descendants()
        .filter(|node| match node.value() {
            Node::Element(el) => is_disallowed_tag(el.name()),
            _ => false,
        })
        .map(|node| node.id())
        .collect();

    let root = crate::dom::body_element(&doc)
        .map(|body| *body)
        .unwrap_or_else(|| doc.tree.root());

    let out = serialize_children(root, &skip, |name, value| {
        if is_event_handler_attr(name) {
            return AttrDecision::Drop;
        }
        if !is_url_attr(name) {
            return AttrDecision::Keep;
        }
        if is_javascript_url(value) {
            return AttrDecision::Drop;
        }
        match base_url.and_then(|base| resolve_relative(base, value)) {
            Some(resolved) => AttrDecision::Replace(resolved),
            None => AttrDecision::Keep,
        }
    });

    out.trim().to_string()
}

fn sanitize_strict(html: &str, base_url: Option<&Url>) -> String {
    let mut builder = ammonia::Builder::new();
    builder
        .tags(STRICT_ALLOWED_TAGS.iter().copied().collect())
        .clean_content_tags(DISALLOWED_TAGS.iter().copied().collect())
        .url_schemes(["http", "https", "mailto"].iter().copied().collect());

    builder.add_tag_attributes("img", &["width", "height"]);
    builder.add_tag_attributes("td", &["colspan", "rowspan"]);
    builder.add_tag_attributes("th", &["colspan", "rowspan"]);

    if let Some(base) = base_url {
        builder.url_relative(ammonia::UrlRelative::RewriteWithBase(base.clone()));
    }

    builder.clean(html).to_string().trim().to_string()
}

/// Resolve a relative URL against `base`. Absolute URLs, fragment-only links
/// and unparsable values yield `None` (keep as-is).
fn resolve_relative(base: &Url, value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || Url::parse(trimmed).is_ok() {
        return None;
    }
    base.join(trimmed).ok().map(|u| u.to_string())
}
