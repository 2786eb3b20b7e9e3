// ABOUTME: Main-content locator: ordered structural selectors with a per-query text-length threshold.
// ABOUTME: Returns the outer HTML of the chosen node, falling back to the document body.

//! Main-content location.
//!
//! Queries in [`CANDIDATE_QUERIES`] are evaluated top to bottom. The first
//! query with any match decides the result: its first match whose visible
//! text reaches the threshold wins, otherwise its first match wins anyway.
//! Later queries are never consulted once an earlier one matched. When no
//! query matches at all, the `<body>` is used.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::dom::{body_html, visible_text_len};
use crate::options::DEFAULT_MIN_CONTENT_CHARS;

/// Structural selectors in priority order.
pub const CANDIDATE_QUERIES: &[&str] = &[
    "article",
    "main",
    "#content",
    "#main",
    r#"[class*="article"]"#,
    r#"[class*="content"]"#,
    r#"[class*="post"]"#,
];

/// Which step of the locator produced the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatedBy {
    /// A candidate query matched; holds its index in [`CANDIDATE_QUERIES`].
    Query(usize),
    /// No candidate query matched.
    Body,
}

/// Located content plus the step that produced it.
#[derive(Debug, Clone)]
pub struct Located {
    pub html: String,
    pub by: LocatedBy,
}

/// Locate the main content with the default 200-character threshold.
pub fn locate(doc: &Html) -> String {
    locate_with_threshold(doc, DEFAULT_MIN_CONTENT_CHARS).html
}

/// Locate the main content; `min_chars` is counted in characters, not bytes.
pub fn locate_with_threshold(doc: &Html, min_chars: usize) -> Located {
    for (idx, query) in CANDIDATE_QUERIES.iter().enumerate() {
        let selector = match Selector::parse(query) {
            Ok(s) => s,
            Err(_) => continue,
        };

        let matches: Vec<ElementRef<'_>> = doc.select(&selector).collect();
        let Some(first) = matches.first() else {
            continue;
        };

        let long_enough = matches.iter().find_map(|el| {
            let len = visible_text_len(*el);
            (len >= min_chars).then_some((el, len))
        });
        let chosen = long_enough.map_or(first, |(el, _)| el);

        debug!(
            query,
            candidates = matches.len(),
            met_threshold = long_enough.is_some(),
            chars = long_enough.map(|(_, len)| len),
            "located main content"
        );
        return Located {
            html: chosen.html(),
            by: LocatedBy::Query(idx),
        };
    }

    debug!("no candidate query matched; using body");
    Located {
        html: body_html(doc),
        by: LocatedBy::Body,
    }
}
