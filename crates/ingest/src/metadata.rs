// ABOUTME: Page metadata extraction for the title and description of ingested content.
// ABOUTME: Reads the <title> element and description meta tags in a fixed priority order.

use scraper::{Html, Selector};

/// Description sources, in priority order.
pub const DESCRIPTION_SELECTORS: &[&str] = &[
    r#"meta[name="description"]"#,
    r#"meta[property="og:description"]"#,
    r#"meta[name="twitter:description"]"#,
];

/// Text of the first `<title>` element, trimmed. `None` if absent or blank.
pub fn extract_title(doc: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let element = doc.select(&selector).next()?;
    let text: String = element.text().collect();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// First non-blank `content` among the description meta tags.
pub fn extract_description(doc: &Html) -> Option<String> {
    DESCRIPTION_SELECTORS
        .iter()
        .find_map(|sel| extract_meta_content(doc, sel))
}

/// Extracts the trimmed `content` attribute from the first matching meta tag
/// that has a non-empty one.
pub fn extract_meta_content(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    for el in doc.select(&sel) {
        if let Some(content) = el.value().attr("content") {
            let trimmed = content.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html>
        <head>
            <title>
                  系所公告 | Department
            </title>
            <meta name="description" content="   ">
            <meta property="og:description" content="  OpenGraph summary  ">
            <meta name="twitter:description" content="Twitter summary">
        </head>
        <body><title>second</title></body>
        </html>
    "#;

    #[test]
    fn title_is_trimmed_first_title() {
        let doc = Html::parse_document(SAMPLE_HTML);
        assert_eq!(extract_title(&doc), Some("系所公告 | Department".to_string()));
    }

    #[test]
    fn title_missing_is_none() {
        let doc = Html::parse_document("<html><head></head><body><h1>Heading</h1></body></html>");
        assert_eq!(extract_title(&doc), None);
    }

    #[test]
    fn title_blank_is_none() {
        let doc = Html::parse_document("<html><head><title>   </title></head></html>");
        assert_eq!(extract_title(&doc), None);
    }

    #[test]
    fn description_skips_blank_and_follows_order() {
        let doc = Html::parse_document(SAMPLE_HTML);
        assert_eq!(
            extract_description(&doc),
            Some("OpenGraph summary".to_string())
        );
    }

    #[test]
    fn description_prefers_meta_name() {
        let doc = Html::parse_document(
            r#"<head><meta name="twitter:description" content="tw"><meta name="description" content="plain"></head>"#,
        );
        assert_eq!(extract_description(&doc), Some("plain".to_string()));
    }

    #[test]
    fn description_twitter_last_resort() {
        let doc = Html::parse_document(
            r#"<head><meta name="twitter:description" content="tw"></head>"#,
        );
        assert_eq!(extract_description(&doc), Some("tw".to_string()));
    }

    #[test]
    fn description_none_when_absent() {
        let doc = Html::parse_document("<head><meta name=\"keywords\" content=\"a,b\"></head>");
        assert_eq!(extract_description(&doc), None);
    }
}
