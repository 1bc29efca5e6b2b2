//! Retrieval-augmented question answering.
//!
//! Retrieves the most similar indexed chunks for a question and feeds them to
//! a chat model as context.

pub mod context;
mod response;

pub use context::ContextBuilder;
pub use response::{RagEngine, RagResponse};

use crate::vector_store::SearchResult;

/// A retrieved chunk, ready for prompt assembly or display.
#[derive(Debug, Clone)]
pub struct ContextChunk {
    /// Source identifier.
    pub source_id: String,
    /// Source title.
    pub source_title: String,
    /// Location within the source ("page 3", section title), if known.
    pub location: Option<String>,
    /// Text content.
    pub content: String,
    /// Similarity score.
    pub score: f32,
}

impl From<SearchResult> for ContextChunk {
    fn from(result: SearchResult) -> Self {
        Self {
            source_id: result.document.source_id.clone(),
            source_title: result.document.source_title.clone(),
            location: result.document.location(),
            content: result.document.content.clone(),
            score: result.score,
        }
    }
}
