//! Text extraction from source documents.
//!
//! Each loader takes a file path or URL and produces an ordered sequence of
//! raw text segments with source metadata (page number, section title). The
//! pipeline splits, embeds, and indexes those segments.

pub mod grobid;
pub mod pdf;
pub mod web;

use serde::{Deserialize, Serialize};

/// A raw text segment extracted from a source, before splitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSegment {
    /// Extracted text.
    pub text: String,
    /// Page number for paginated sources (1-based).
    pub page: Option<u32>,
    /// Section title for structurally parsed sources.
    pub section: Option<String>,
}

impl SourceSegment {
    /// A segment from a specific page.
    pub fn page(text: String, page: u32) -> Self {
        Self {
            text,
            page: Some(page),
            section: None,
        }
    }

    /// A segment belonging to a named section.
    pub fn section(text: String, section: Option<String>) -> Self {
        Self {
            text,
            page: None,
            section,
        }
    }

    /// A segment with no structural metadata.
    pub fn plain(text: String) -> Self {
        Self {
            text,
            page: None,
            section: None,
        }
    }
}

/// Collapse runs of whitespace into single spaces and trim.
pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("  hello \n\t world  "),
            "hello world"
        );
        assert_eq!(normalize_whitespace(""), "");
    }
}
