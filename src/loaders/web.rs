//! Web page text extraction.

use super::{normalize_whitespace, SourceSegment};
use crate::error::{Result, SvarError};
use scraper::{Html, Node};
use std::time::Duration;
use tracing::{debug, instrument};

/// Elements whose text content is never part of the readable page.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "head", "template"];

/// Fetch a URL and extract its readable text as a single segment, along with
/// the page title when present.
///
/// Network errors and non-2xx responses propagate as errors; a page with no
/// extractable text yields zero segments.
#[instrument(skip_all, fields(url = %url))]
pub async fn load_url(
    url: &str,
    timeout: Duration,
) -> Result<(Option<String>, Vec<SourceSegment>)> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(SvarError::Http)?;

    let response = client.get(url).send().await?.error_for_status()?;
    let html = response.text().await?;

    let title = extract_title(&html);
    let text = extract_text(&html);
    debug!("Extracted {} characters from page", text.len());

    if text.is_empty() {
        return Ok((title, Vec::new()));
    }
    Ok((title, vec![SourceSegment::plain(text)]))
}

/// Extract the page title, if present.
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = scraper::Selector::parse("title").expect("static selector");
    document
        .select(&selector)
        .next()
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

/// Extract readable text from an HTML document, skipping script and style
/// content.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();

    for node in document.tree.root().descendants() {
        let Node::Text(t) = node.value() else {
            continue;
        };
        let skipped = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        if !skipped {
            text.push_str(t);
            text.push(' ');
        }
    }

    normalize_whitespace(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_skips_scripts() {
        let html = r#"<html><head><title>Test Page</title>
            <script>var x = "hidden";</script>
            <style>.a { color: red; }</style></head>
            <body><h1>Heading</h1><p>First paragraph.</p>
            <script>console.log("also hidden")</script>
            <p>Second paragraph.</p></body></html>"#;

        let text = extract_text(html);
        assert!(text.contains("Heading"));
        assert!(text.contains("First paragraph."));
        assert!(text.contains("Second paragraph."));
        assert!(!text.contains("hidden"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title>  My   Page </title></head><body></body></html>";
        assert_eq!(extract_title(html), Some("My Page".to_string()));
        assert_eq!(extract_title("<html><body>no title</body></html>"), None);
    }

    #[test]
    fn test_empty_page_yields_no_text() {
        assert_eq!(extract_text("<html><body></body></html>"), "");
    }

    #[tokio::test]
    async fn test_unreachable_url_is_an_error() {
        let result = load_url(
            "http://127.0.0.1:1/never-listening",
            Duration::from_millis(500),
        )
        .await;
        assert!(result.is_err());
    }
}
