//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! For large datasets, consider the sqlite-vec extension or a dedicated
//! vector database.

use super::{cosine_similarity, Document, IndexedSource, SearchResult, VectorStore};
use crate::error::{Result, SvarError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        id TEXT PRIMARY KEY,
        source_id TEXT NOT NULL,
        source_title TEXT NOT NULL,
        page INTEGER,
        section TEXT,
        content TEXT NOT NULL,
        embedding BLOB NOT NULL,
        chunk_order INTEGER NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_documents_source_id ON documents(source_id);
    CREATE INDEX IF NOT EXISTS idx_documents_indexed_at ON documents(indexed_at);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) a store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SvarError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to little-endian bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
        let id_str: String = row.get(0)?;
        let embedding_bytes: Vec<u8> = row.get(6)?;
        let indexed_at_str: String = row.get(8)?;

        Ok(Document {
            id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
            source_id: row.get(1)?,
            source_title: row.get(2)?,
            page: row.get(3)?,
            section: row.get(4)?,
            content: row.get(5)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            chunk_order: row.get(7)?,
            indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, doc))]
    async fn upsert(&self, doc: &Document) -> Result<()> {
        let conn = self.lock()?;

        let embedding_bytes = Self::embedding_to_bytes(&doc.embedding);

        conn.execute(
            r#"
            INSERT OR REPLACE INTO documents
            (id, source_id, source_title, page, section, content, embedding, chunk_order, indexed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                doc.id.to_string(),
                doc.source_id,
                doc.source_title,
                doc.page,
                doc.section,
                doc.content,
                embedding_bytes,
                doc.chunk_order,
                doc.indexed_at.to_rfc3339(),
            ],
        )?;

        debug!("Upserted document {}", doc.id);
        Ok(())
    }

    #[instrument(skip(self, docs))]
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let conn = self.lock()?;

        let tx = conn.unchecked_transaction()?;

        for doc in docs {
            let embedding_bytes = Self::embedding_to_bytes(&doc.embedding);

            tx.execute(
                r#"
                INSERT OR REPLACE INTO documents
                (id, source_id, source_title, page, section, content, embedding, chunk_order, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    doc.id.to_string(),
                    doc.source_id,
                    doc.source_title,
                    doc.page,
                    doc.section,
                    doc.content,
                    embedding_bytes,
                    doc.chunk_order,
                    doc.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Batch upserted {} documents", docs.len());
        Ok(docs.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.search_with_threshold(query_embedding, limit, 0.0).await
    }

    #[instrument(skip(self, query_embedding))]
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, source_id, source_title, page, section, content,
                   embedding, chunk_order, indexed_at
            FROM documents
            "#,
        )?;

        let docs = stmt.query_map([], Self::row_to_document)?;

        let mut results: Vec<SearchResult> = docs
            .filter_map(|doc_result| doc_result.ok())
            .map(|doc| {
                let score = cosine_similarity(query_embedding, &doc.embedding);
                SearchResult {
                    document: doc,
                    score,
                }
            })
            .filter(|r| r.score >= min_score)
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        debug!("Found {} matching documents", results.len());
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT source_id, source_title, COUNT(*) as chunk_count,
                   MAX(indexed_at) as indexed_at
            FROM documents
            GROUP BY source_id
            ORDER BY indexed_at DESC
            "#,
        )?;

        let sources = stmt.query_map([], |row| {
            let indexed_at_str: String = row.get(3)?;
            Ok(IndexedSource {
                source_id: row.get(0)?,
                source_title: row.get(1)?,
                chunk_count: row.get(2)?,
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        let result: Vec<IndexedSource> = sources.filter_map(|v| v.ok()).collect();
        Ok(result)
    }

    async fn document_count(&self) -> Result<usize> {
        let conn = self.lock()?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<usize> {
        let conn = self.lock()?;

        let deleted = conn.execute("DELETE FROM documents", [])?;
        info!("Cleared {} documents", deleted);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(source_id: &str, content: &str, embedding: Vec<f32>, order: i32) -> Document {
        Document::new(
            source_id.to_string(),
            source_id.to_string(),
            Some(1),
            None,
            content.to_string(),
            embedding,
            order,
        )
    }

    #[tokio::test]
    async fn test_sqlite_roundtrip() {
        let store = SqliteVectorStore::in_memory().unwrap();

        store
            .upsert(&doc("report.pdf", "This is test content", vec![1.0, 0.0, 0.0], 0))
            .await
            .unwrap();

        let sources = store.list_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].source_id, "report.pdf");

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 0.001);
        assert_eq!(results[0].document.page, Some(1));
        assert_eq!(results[0].document.content, "This is test content");
    }

    #[tokio::test]
    async fn test_clear() {
        let store = SqliteVectorStore::in_memory().unwrap();
        store
            .upsert_batch(&[
                doc("a.pdf", "one", vec![1.0, 0.0], 0),
                doc("a.pdf", "two", vec![0.0, 1.0], 1),
            ])
            .await
            .unwrap();

        assert_eq!(store.clear().await.unwrap(), 2);
        assert_eq!(store.document_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_threshold_filters_low_scores() {
        let store = SqliteVectorStore::in_memory().unwrap();
        store
            .upsert_batch(&[
                doc("a.pdf", "close", vec![1.0, 0.0], 0),
                doc("a.pdf", "far", vec![0.0, 1.0], 1),
            ])
            .await
            .unwrap();

        let results = store
            .search_with_threshold(&[1.0, 0.0], 10, 0.5)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.content, "close");
    }
}
