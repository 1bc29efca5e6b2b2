//! Vector store abstraction.
//!
//! Provides a trait-based interface for different vector database backends.
//! The pipeline keeps two separate stores: one for documents (PDFs, web
//! pages, papers) and one for media transcripts. They are never queried
//! together.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An embedded chunk stored in the vector database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique chunk ID.
    pub id: Uuid,
    /// Identifier of the source this chunk came from (path, URL, or media ID).
    pub source_id: String,
    /// Human-readable source title.
    pub source_title: String,
    /// Page number for paginated sources (1-based).
    pub page: Option<u32>,
    /// Section title for structurally parsed sources.
    pub section: Option<String>,
    /// Text content of this chunk.
    pub content: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// Order of this chunk within its source.
    pub chunk_order: i32,
    /// When this chunk was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Document {
    /// Create a new chunk with a fresh ID. Re-ingesting the same source
    /// therefore produces new rows rather than overwriting old ones.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source_id: String,
        source_title: String,
        page: Option<u32>,
        section: Option<String>,
        content: String,
        embedding: Vec<f32>,
        chunk_order: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_id,
            source_title,
            page,
            section,
            content,
            embedding,
            chunk_order,
            indexed_at: Utc::now(),
        }
    }

    /// Human-readable location within the source, for display.
    pub fn location(&self) -> Option<String> {
        match (&self.page, &self.section) {
            (Some(page), _) => Some(format!("page {}", page)),
            (None, Some(section)) => Some(section.clone()),
            (None, None) => None,
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched chunk.
    pub document: Document,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Summary information about an indexed source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedSource {
    /// Source identifier.
    pub source_id: String,
    /// Source title.
    pub source_title: String,
    /// Number of indexed chunks.
    pub chunk_count: u32,
    /// When the source was last indexed.
    pub indexed_at: DateTime<Utc>,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store a chunk with its embedding.
    async fn upsert(&self, doc: &Document) -> Result<()>;

    /// Bulk upsert chunks.
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize>;

    /// Search for similar chunks.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>>;

    /// Search with a minimum similarity threshold.
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>>;

    /// List all indexed sources.
    async fn list_sources(&self) -> Result<Vec<IndexedSource>>;

    /// Get total chunk count.
    async fn document_count(&self) -> Result<usize>;

    /// Remove every chunk from the store.
    async fn clear(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_document_location() {
        let page_doc = Document::new(
            "report.pdf".to_string(),
            "report".to_string(),
            Some(3),
            None,
            "content".to_string(),
            vec![],
            0,
        );
        assert_eq!(page_doc.location().as_deref(), Some("page 3"));

        let section_doc = Document::new(
            "paper.pdf".to_string(),
            "paper".to_string(),
            None,
            Some("Methods".to_string()),
            "content".to_string(),
            vec![],
            0,
        );
        assert_eq!(section_doc.location().as_deref(), Some("Methods"));

        let plain_doc = Document::new(
            "https://example.com".to_string(),
            "Example".to_string(),
            None,
            None,
            "content".to_string(),
            vec![],
            0,
        );
        assert_eq!(plain_doc.location(), None);
    }
}
