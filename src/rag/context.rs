//! Context retrieval for RAG responses.

use super::ContextChunk;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::VectorStore;
use std::sync::Arc;

/// Retrieves the most relevant chunks for a query.
pub struct ContextBuilder {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    max_chunks: usize,
}

impl ContextBuilder {
    /// Create a new context builder. Every retrieved chunk is kept, however
    /// weak the match.
    pub fn new(vector_store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            vector_store,
            embedder,
            max_chunks: 3,
        }
    }

    /// Set the maximum number of context chunks.
    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// Embed the query and retrieve the closest chunks.
    pub async fn build(&self, query: &str) -> Result<Vec<ContextChunk>> {
        let query_embedding = self.embedder.embed(query).await?;

        let results = self
            .vector_store
            .search(&query_embedding, self.max_chunks)
            .await?;

        Ok(results.into_iter().map(ContextChunk::from).collect())
    }
}

/// Format context chunks for inclusion in a prompt: chunk texts joined by
/// blank lines.
pub fn format_context_for_prompt(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format context chunks for display to the user.
pub fn format_context_for_display(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| {
            let location_part = chunk
                .location
                .as_ref()
                .map(|l| format!(", {}", l))
                .unwrap_or_default();

            format!(
                "{}{} (score: {:.2})",
                chunk.source_title, location_part, chunk.score
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str, location: Option<&str>) -> ContextChunk {
        ContextChunk {
            source_id: "report.pdf".to_string(),
            source_title: "report".to_string(),
            location: location.map(String::from),
            content: content.to_string(),
            score: 0.9,
        }
    }

    #[test]
    fn test_format_context_for_prompt_joins_with_blank_lines() {
        let chunks = vec![chunk("first chunk", Some("page 1")), chunk("second chunk", None)];
        assert_eq!(
            format_context_for_prompt(&chunks),
            "first chunk\n\nsecond chunk"
        );
    }

    #[test]
    fn test_format_context_for_display_includes_location() {
        let chunks = vec![chunk("text", Some("page 2"))];
        let display = format_context_for_display(&chunks);
        assert!(display.contains("report, page 2"));
        assert!(display.contains("0.90"));
    }

    #[test]
    fn test_empty_context_formats_to_empty_string() {
        assert_eq!(format_context_for_prompt(&[]), "");
    }
}
