//! Research paper extraction through a Grobid service.
//!
//! Grobid converts a scholarly PDF into TEI XML with the paper's structure
//! (abstract, sections, paragraphs) recovered. We post the PDF to a locally
//! running Grobid instance and turn the TEI response into per-paragraph
//! segments tagged with their section title.

use super::{normalize_whitespace, SourceSegment};
use crate::error::{Result, SvarError};
use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

/// Send a PDF to Grobid's full-text endpoint and parse the TEI response into
/// section/paragraph segments.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn load_research_paper(
    path: &Path,
    grobid_url: &str,
    timeout: Duration,
) -> Result<Vec<SourceSegment>> {
    let bytes = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input.pdf".to_string());

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(SvarError::Http)?;

    let part = reqwest::multipart::Part::bytes(bytes)
        .file_name(filename)
        .mime_str("application/pdf")?;
    let form = reqwest::multipart::Form::new().part("input", part);

    let url = format!(
        "{}/api/processFulltextDocument",
        grobid_url.trim_end_matches('/')
    );
    let response = client
        .post(&url)
        .multipart(form)
        .send()
        .await
        .map_err(|e| {
            SvarError::Loader(format!("Grobid request to {} failed: {}", url, e))
        })?
        .error_for_status()
        .map_err(|e| SvarError::Loader(format!("Grobid returned an error: {}", e)))?;

    let tei = response.text().await?;
    let segments = parse_tei(&tei);
    debug!("Parsed {} segments from TEI", segments.len());
    Ok(segments)
}

/// Parse Grobid's TEI XML into segments: abstract paragraphs first, then one
/// segment per body paragraph tagged with its section title.
///
/// The TEI is parsed leniently with an HTML parser. Section titles live in
/// TEI `<head>` elements, which an HTML parser silently drops inside body
/// content, so they are renamed before parsing.
pub fn parse_tei(tei: &str) -> Vec<SourceSegment> {
    let prepared = tei.replace("<head", "<h1").replace("</head>", "</h1>");
    let document = Html::parse_document(&prepared);

    let abstract_p = Selector::parse("abstract p").expect("static selector");
    let div = Selector::parse("div").expect("static selector");
    let title = Selector::parse("h1").expect("static selector");
    let paragraph = Selector::parse("p").expect("static selector");

    let mut segments = Vec::new();

    for p in document.select(&abstract_p) {
        let text = normalize_whitespace(&p.text().collect::<String>());
        if !text.is_empty() {
            segments.push(SourceSegment::section(text, Some("Abstract".to_string())));
        }
    }

    for section in document.select(&div) {
        if in_skipped_context(&section) {
            continue;
        }

        let section_title = section
            .select(&title)
            .next()
            .map(|h| normalize_whitespace(&h.text().collect::<String>()))
            .filter(|t| !t.is_empty());

        for p in section.select(&paragraph) {
            let text = normalize_whitespace(&p.text().collect::<String>());
            if !text.is_empty() {
                segments.push(SourceSegment::section(text, section_title.clone()));
            }
        }
    }

    segments
}

/// True for divs inside the TEI header or abstract (handled separately) or
/// nested inside another div (the outer div already covers them).
fn in_skipped_context(element: &ElementRef) -> bool {
    element.ancestors().any(|a| {
        a.value().as_element().is_some_and(|el| {
            matches!(el.name(), "teiheader" | "abstract" | "figure" | "div")
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEI: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <teiHeader>
    <fileDesc><titleStmt><title>A Study of Things</title></titleStmt></fileDesc>
    <profileDesc>
      <abstract>
        <p>We study things and report results.</p>
      </abstract>
    </profileDesc>
  </teiHeader>
  <text>
    <body>
      <div>
        <head>Introduction</head>
        <p>Things are interesting.</p>
        <p>Nobody has studied them properly.</p>
      </div>
      <div>
        <head n="2">Methods</head>
        <p>We looked very carefully.</p>
      </div>
    </body>
  </text>
</TEI>"#;

    #[test]
    fn test_parse_tei_sections() {
        let segments = parse_tei(TEI);

        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0].section.as_deref(), Some("Abstract"));
        assert_eq!(segments[0].text, "We study things and report results.");

        assert_eq!(segments[1].section.as_deref(), Some("Introduction"));
        assert_eq!(segments[1].text, "Things are interesting.");
        assert_eq!(segments[2].section.as_deref(), Some("Introduction"));

        assert_eq!(segments[3].section.as_deref(), Some("Methods"));
        assert_eq!(segments[3].text, "We looked very carefully.");
    }

    #[test]
    fn test_section_titles_not_in_paragraph_text() {
        let segments = parse_tei(TEI);
        assert!(segments.iter().all(|s| !s.text.contains("Introduction")));
    }

    #[test]
    fn test_empty_tei() {
        assert!(parse_tei("").is_empty());
        assert!(parse_tei("<TEI><teiHeader></teiHeader></TEI>").is_empty());
    }
}
