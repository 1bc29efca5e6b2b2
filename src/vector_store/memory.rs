//! In-memory vector store implementation.
//!
//! The default backend. Contents live only for the lifetime of the process.

use super::{cosine_similarity, Document, IndexedSource, SearchResult, VectorStore};
use crate::error::{Result, SvarError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector store.
pub struct MemoryVectorStore {
    documents: RwLock<HashMap<String, Document>>,
    /// Expected embedding dimension; mismatched vectors are rejected.
    dimension: Option<usize>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            dimension: None,
        }
    }

    /// Create a store that enforces a fixed embedding dimension.
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            dimension: Some(dimension),
        }
    }

    fn check_dimension(&self, doc: &Document) -> Result<()> {
        if let Some(expected) = self.dimension {
            if doc.embedding.len() != expected {
                return Err(SvarError::VectorStore(format!(
                    "Embedding dimension mismatch: expected {}, got {}",
                    expected,
                    doc.embedding.len()
                )));
            }
        }
        Ok(())
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, doc: &Document) -> Result<()> {
        self.check_dimension(doc)?;
        let mut docs = self.documents.write().unwrap();
        docs.insert(doc.id.to_string(), doc.clone());
        Ok(())
    }

    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        for doc in docs {
            self.check_dimension(doc)?;
        }
        let mut store = self.documents.write().unwrap();
        for doc in docs {
            store.insert(doc.id.to_string(), doc.clone());
        }
        Ok(docs.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.search_with_threshold(query_embedding, limit, 0.0).await
    }

    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let docs = self.documents.read().unwrap();

        let mut results: Vec<SearchResult> = docs
            .values()
            .map(|doc| {
                let score = cosine_similarity(query_embedding, &doc.embedding);
                SearchResult {
                    document: doc.clone(),
                    score,
                }
            })
            .filter(|r| r.score >= min_score)
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        Ok(results)
    }

    async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
        let docs = self.documents.read().unwrap();

        let mut source_map: HashMap<String, IndexedSource> = HashMap::new();

        for doc in docs.values() {
            let entry = source_map
                .entry(doc.source_id.clone())
                .or_insert_with(|| IndexedSource {
                    source_id: doc.source_id.clone(),
                    source_title: doc.source_title.clone(),
                    chunk_count: 0,
                    indexed_at: doc.indexed_at,
                });

            entry.chunk_count += 1;
            if doc.indexed_at > entry.indexed_at {
                entry.indexed_at = doc.indexed_at;
            }
        }

        let mut sources: Vec<IndexedSource> = source_map.into_values().collect();
        sources.sort_by(|a, b| b.indexed_at.cmp(&a.indexed_at));

        Ok(sources)
    }

    async fn document_count(&self) -> Result<usize> {
        let docs = self.documents.read().unwrap();
        Ok(docs.len())
    }

    async fn clear(&self) -> Result<usize> {
        let mut docs = self.documents.write().unwrap();
        let removed = docs.len();
        docs.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(source_id: &str, content: &str, embedding: Vec<f32>, order: i32) -> Document {
        Document::new(
            source_id.to_string(),
            source_id.to_string(),
            None,
            None,
            content.to_string(),
            embedding,
            order,
        )
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let store = MemoryVectorStore::new();
        store
            .upsert_batch(&[
                doc("a.pdf", "Hello world", vec![1.0, 0.0, 0.0], 0),
                doc("a.pdf", "Goodbye world", vec![0.0, 1.0, 0.0], 1),
            ])
            .await
            .unwrap();

        assert_eq!(store.document_count().await.unwrap(), 2);

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score > results[1].score);
        assert_eq!(results[0].document.content, "Hello world");
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let store = MemoryVectorStore::new();
        let docs: Vec<Document> = (0..10)
            .map(|i| doc("a.pdf", &format!("chunk {i}"), vec![1.0, i as f32], i))
            .collect();
        store.upsert_batch(&docs).await.unwrap();

        let results = store.search(&[1.0, 1.0], 3).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_reingest_doubles_chunks() {
        let store = MemoryVectorStore::new();
        store
            .upsert(&doc("a.pdf", "same text", vec![1.0, 0.0], 0))
            .await
            .unwrap();
        store
            .upsert(&doc("a.pdf", "same text", vec![1.0, 0.0], 0))
            .await
            .unwrap();

        // Fresh IDs mean duplicates accumulate rather than overwrite.
        assert_eq!(store.document_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        let store = MemoryVectorStore::with_dimension(3);
        let result = store.upsert(&doc("a.pdf", "text", vec![1.0, 0.0], 0)).await;
        assert!(result.is_err());

        let ok = store
            .upsert(&doc("a.pdf", "text", vec![1.0, 0.0, 0.0], 0))
            .await;
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn test_clear_empties_store() {
        let store = MemoryVectorStore::new();
        store
            .upsert_batch(&[
                doc("a.pdf", "one", vec![1.0], 0),
                doc("b.pdf", "two", vec![0.5], 0),
            ])
            .await
            .unwrap();

        assert_eq!(store.clear().await.unwrap(), 2);
        assert_eq!(store.document_count().await.unwrap(), 0);
        assert!(store.search(&[1.0], 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_sources_groups_chunks() {
        let store = MemoryVectorStore::new();
        store
            .upsert_batch(&[
                doc("a.pdf", "one", vec![1.0], 0),
                doc("a.pdf", "two", vec![0.5], 1),
                doc("b.pdf", "three", vec![0.2], 0),
            ])
            .await
            .unwrap();

        let sources = store.list_sources().await.unwrap();
        assert_eq!(sources.len(), 2);
        let a = sources.iter().find(|s| s.source_id == "a.pdf").unwrap();
        assert_eq!(a.chunk_count, 2);
    }
}
