//! PDF text extraction, one segment per page.

use super::{normalize_whitespace, SourceSegment};
use crate::error::Result;
use lopdf::Document;
use std::path::Path;
use tracing::{debug, instrument};

/// Load a PDF and extract one text segment per page.
///
/// Pages with no extractable text are skipped; a fully image-based PDF
/// therefore yields zero segments, which the caller reports as a failed
/// ingestion.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_pdf(path: &Path) -> Result<Vec<SourceSegment>> {
    let doc = Document::load(path)?;

    let mut segments = Vec::new();
    for (page_number, _) in doc.get_pages() {
        let text = match doc.extract_text(&[page_number]) {
            Ok(t) => t,
            Err(e) => {
                debug!("Skipping page {}: {}", page_number, e);
                continue;
            }
        };

        let text = normalize_whitespace(&text);
        if !text.is_empty() {
            segments.push(SourceSegment::page(text, page_number));
        }
    }

    debug!("Extracted {} page segments", segments.len());
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_pdf(Path::new("/nonexistent/missing.pdf"));
        assert!(result.is_err());
    }

    #[test]
    fn test_not_a_pdf_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();
        assert!(load_pdf(&path).is_err());
    }
}
