//! The ingestion and question-answering pipeline.
//!
//! Owns every component (embedder, vector stores, transcriber, prompts) and
//! exposes the operations the CLI and HTTP server call. Two vector stores are
//! kept: one for documents (PDFs, web pages, papers) and one for audio/video
//! transcripts. Questions are answered against one or the other, never both.

use crate::audio::extract_audio;
use crate::chunking::{SplitConfig, TextSplitter};
use crate::config::{Prompts, Settings, TranscriptionProvider};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, SvarError};
use crate::loaders::{grobid, pdf, web, SourceSegment};
use crate::rag::{RagEngine, RagResponse};
use crate::transcription::{
    ApiWhisperTranscriber, LocalWhisperTranscriber, Transcriber,
};
use crate::vector_store::{
    Document, IndexedSource, MemoryVectorStore, SqliteVectorStore, VectorStore,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// Result of indexing a source.
#[derive(Debug, Clone, Serialize)]
pub struct IngestResult {
    /// Source identifier (path, URL, or media ID).
    pub source_id: String,
    /// Human-readable title.
    pub title: String,
    /// Number of chunks indexed.
    pub chunks_indexed: usize,
}

/// Result of a media question: what was indexed plus the answer.
#[derive(Debug, Clone)]
pub struct MediaRagResult {
    /// The transcript ingestion outcome.
    pub ingest: IngestResult,
    /// The generated answer with sources.
    pub response: RagResponse,
}

/// The main pipeline, built once and shared by all commands.
pub struct Pipeline {
    settings: Settings,
    prompts: Prompts,
    embedder: Arc<dyn Embedder>,
    documents: Arc<dyn VectorStore>,
    media: Arc<dyn VectorStore>,
    transcriber: Arc<dyn Transcriber>,
    temp_dir: PathBuf,
}

impl Pipeline {
    /// Build the pipeline from settings and verify the embedding backend by
    /// probing it once. The probe also pins the embedding dimension for the
    /// in-memory stores.
    #[instrument(skip_all)]
    pub async fn init(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding));

        let probe = embedder.embed("test").await?;
        let dimension = probe.len();
        info!("Embedding backend ready ({} dimensions)", dimension);

        let (documents, media): (Arc<dyn VectorStore>, Arc<dyn VectorStore>) =
            match settings.vector_store.provider.as_str() {
                "memory" => (
                    Arc::new(MemoryVectorStore::with_dimension(dimension)),
                    Arc::new(MemoryVectorStore::with_dimension(dimension)),
                ),
                "sqlite" => (
                    Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?),
                    Arc::new(SqliteVectorStore::new(&settings.media_sqlite_path())?),
                ),
                other => {
                    return Err(SvarError::Config(format!(
                        "Unknown vector store provider: {}",
                        other
                    )));
                }
            };

        let transcriber: Arc<dyn Transcriber> = match settings.transcription.provider {
            TranscriptionProvider::Local => Arc::new(LocalWhisperTranscriber::new(
                settings.transcription.binary.clone(),
                settings.whisper_model_path(),
            )),
            TranscriptionProvider::Api => {
                Arc::new(ApiWhisperTranscriber::new(&settings.transcription.api_model))
            }
        };

        Self::with_components(settings, prompts, embedder, documents, media, transcriber)
    }

    /// Build the pipeline from pre-constructed components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        embedder: Arc<dyn Embedder>,
        documents: Arc<dyn VectorStore>,
        media: Arc<dyn VectorStore>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Result<Self> {
        let temp_dir = settings.temp_dir();
        std::fs::create_dir_all(&temp_dir)?;

        Ok(Self {
            settings,
            prompts,
            embedder,
            documents,
            media,
            transcriber,
            temp_dir,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The document store (as trait object).
    pub fn document_store(&self) -> Arc<dyn VectorStore> {
        self.documents.clone()
    }

    /// The media transcript store (as trait object).
    pub fn media_store(&self) -> Arc<dyn VectorStore> {
        self.media.clone()
    }

    // ------------------------------------------------------------------
    // Document ingestion
    // ------------------------------------------------------------------

    /// Index a PDF file, one segment per page.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn add_pdf(&self, path: &Path) -> Result<IngestResult> {
        let segments = pdf::load_pdf(path)?;
        let source_id = path.display().to_string();
        let title = title_from_path(path);
        self.index_segments(&self.documents, &source_id, &title, &segments, self.document_split())
            .await
    }

    /// Fetch and index a web page.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn add_url(&self, url: &str) -> Result<IngestResult> {
        let timeout = Duration::from_secs(self.settings.loaders.http_timeout_seconds);
        let (title, segments) = web::load_url(url, timeout).await?;
        let title = title.unwrap_or_else(|| url.to_string());
        self.index_segments(&self.documents, url, &title, &segments, self.document_split())
            .await
    }

    /// Index a research paper through Grobid, preserving section structure.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn add_research_paper(&self, path: &Path) -> Result<IngestResult> {
        let timeout = Duration::from_secs(self.settings.loaders.http_timeout_seconds);
        let segments =
            grobid::load_research_paper(path, &self.settings.loaders.grobid_url, timeout).await?;
        let source_id = path.display().to_string();
        let title = title_from_path(path);
        self.index_segments(&self.documents, &source_id, &title, &segments, self.document_split())
            .await
    }

    /// Split, embed, and store a source's segments.
    ///
    /// Chunk IDs are always fresh, so re-ingesting a source adds a second
    /// copy of its chunks rather than replacing the first.
    async fn index_segments(
        &self,
        store: &Arc<dyn VectorStore>,
        source_id: &str,
        title: &str,
        segments: &[SourceSegment],
        split_config: SplitConfig,
    ) -> Result<IngestResult> {
        let splitter = TextSplitter::new(split_config);

        let mut texts = Vec::new();
        let mut metadata = Vec::new();
        for segment in segments {
            for chunk in splitter.split(&segment.text) {
                texts.push(chunk);
                metadata.push((segment.page, segment.section.clone()));
            }
        }

        if texts.is_empty() {
            return Err(SvarError::NoContent(source_id.to_string()));
        }

        let embeddings = self.embedder.embed_batch(&texts).await?;

        let docs: Vec<Document> = texts
            .into_iter()
            .zip(embeddings)
            .zip(metadata)
            .enumerate()
            .map(|(order, ((content, embedding), (page, section)))| {
                Document::new(
                    source_id.to_string(),
                    title.to_string(),
                    page,
                    section,
                    content,
                    embedding,
                    order as i32,
                )
            })
            .collect();

        let count = store.upsert_batch(&docs).await?;
        info!("Indexed {} chunks from {}", count, source_id);

        Ok(IngestResult {
            source_id: source_id.to_string(),
            title: title.to_string(),
            chunks_indexed: count,
        })
    }

    // ------------------------------------------------------------------
    // Question answering
    // ------------------------------------------------------------------

    /// Answer a question against the document collection.
    pub async fn ask(
        &self,
        question: &str,
        model: Option<&str>,
        top_k: Option<usize>,
    ) -> Result<RagResponse> {
        let engine = RagEngine::new(
            self.documents.clone(),
            self.embedder.clone(),
            model.unwrap_or(&self.settings.rag.model),
            top_k.unwrap_or(self.settings.rag.top_k),
        )
        .with_prompts(self.prompts.clone());

        engine.ask(question).await
    }

    /// Answer a question against the media transcript collection.
    pub async fn ask_media(&self, question: &str, top_k: Option<usize>) -> Result<RagResponse> {
        let engine = RagEngine::new(
            self.media.clone(),
            self.embedder.clone(),
            &self.settings.rag.model,
            top_k.unwrap_or(self.settings.rag.top_k),
        )
        .with_prompts(self.prompts.clone())
        .with_templates(
            self.prompts.rag.media_system.clone(),
            self.prompts.rag.media_user.clone(),
        );

        engine.ask(question).await
    }

    /// Embed the query and return the closest document chunks without calling
    /// the chat model.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<crate::vector_store::SearchResult>> {
        let embedding = self.embedder.embed(query).await?;
        self.documents
            .search_with_threshold(&embedding, limit, min_score)
            .await
    }

    // ------------------------------------------------------------------
    // Media
    // ------------------------------------------------------------------

    /// Transcribe an audio file, index the transcript, and answer a question
    /// against the media collection.
    ///
    /// Earlier transcripts stay in the collection and remain searchable;
    /// `reset` clears them first.
    #[instrument(skip(self, query), fields(path = %audio_path.display()))]
    pub async fn audio_rag(
        &self,
        audio_path: &Path,
        query: &str,
        reset: bool,
    ) -> Result<MediaRagResult> {
        if !audio_path.exists() {
            return Err(SvarError::MediaNotFound(audio_path.display().to_string()));
        }

        let source_id = title_from_path(audio_path);
        let ingest = self.ingest_media(audio_path, &source_id, reset).await?;
        let response = self.ask_media(query, None).await?;

        Ok(MediaRagResult { ingest, response })
    }

    /// Extract the audio track from a video, then run [`Self::audio_rag`]
    /// semantics on it.
    #[instrument(skip(self, query), fields(path = %video_path.display()))]
    pub async fn video_rag(
        &self,
        video_path: &Path,
        query: &str,
        reset: bool,
    ) -> Result<MediaRagResult> {
        let audio_path = extract_audio(video_path, &self.temp_dir).await?;

        let source_id = title_from_path(video_path);
        let ingest = self.ingest_media(&audio_path, &source_id, reset).await?;
        let response = self.ask_media(query, None).await?;

        Ok(MediaRagResult { ingest, response })
    }

    /// Transcribe and index one media file into the media collection.
    pub(crate) async fn ingest_media(
        &self,
        audio_path: &Path,
        source_id: &str,
        reset: bool,
    ) -> Result<IngestResult> {
        if reset {
            let removed = self.media.clear().await?;
            info!("Cleared {} chunks from the media collection", removed);
        }

        let transcript = self.transcriber.transcribe(audio_path).await?;
        let segments = vec![SourceSegment::plain(transcript.full_text)];

        self.index_segments(&self.media, source_id, source_id, &segments, self.transcript_split())
            .await
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// List indexed document sources.
    pub async fn document_sources(&self) -> Result<Vec<IndexedSource>> {
        self.documents.list_sources().await
    }

    /// List indexed media sources.
    pub async fn media_sources(&self) -> Result<Vec<IndexedSource>> {
        self.media.list_sources().await
    }

    fn document_split(&self) -> SplitConfig {
        SplitConfig::new(
            self.settings.chunking.document_chunk_size,
            self.settings.chunking.document_chunk_overlap,
        )
    }

    fn transcript_split(&self) -> SplitConfig {
        SplitConfig::new(
            self.settings.chunking.transcript_chunk_size,
            self.settings.chunking.transcript_chunk_overlap,
        )
    }
}

/// File stem as a human-readable title.
fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::ContextBuilder;
    use crate::transcription::{Transcript, TranscriptSegment};
    use async_trait::async_trait;

    /// Deterministic embedder: letter-frequency vectors. Texts sharing rare
    /// words score higher against each other than against unrelated texts.
    struct LetterFrequencyEmbedder;

    #[async_trait]
    impl Embedder for LetterFrequencyEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut counts = vec![0.0f32; 26];
            for c in text.to_lowercase().chars() {
                if c.is_ascii_lowercase() {
                    counts[(c as u8 - b'a') as usize] += 1.0;
                }
            }
            Ok(counts)
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            26
        }
    }

    struct FixedTranscriber {
        text: String,
    }

    #[async_trait]
    impl Transcriber for FixedTranscriber {
        async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
            Ok(Transcript::new(
                crate::transcription::source_id_for(audio_path),
                vec![TranscriptSegment::new(0.0, 10.0, self.text.clone())],
            ))
        }
    }

    fn test_pipeline(transcript_text: &str) -> Pipeline {
        let mut settings = Settings::default();
        settings.general.temp_dir = std::env::temp_dir()
            .join("svar-pipeline-tests")
            .display()
            .to_string();

        Pipeline::with_components(
            settings,
            Prompts::default(),
            Arc::new(LetterFrequencyEmbedder),
            Arc::new(MemoryVectorStore::new()),
            Arc::new(MemoryVectorStore::new()),
            Arc::new(FixedTranscriber {
                text: transcript_text.to_string(),
            }),
        )
        .unwrap()
    }

    fn page(text: &str, number: u32) -> SourceSegment {
        SourceSegment::page(text.to_string(), number)
    }

    #[tokio::test]
    async fn test_retrieval_finds_the_right_page() {
        let pipeline = test_pipeline("");
        let segments = vec![
            page("aaaa aaaa aaaa aaaa", 1),
            page("zzzz zzzz zzzz zzzz", 2),
            page("mmmm mmmm mmmm mmmm", 3),
        ];

        pipeline
            .index_segments(
                &pipeline.documents,
                "book.pdf",
                "book",
                &segments,
                SplitConfig::document(),
            )
            .await
            .unwrap();

        let builder =
            ContextBuilder::new(pipeline.documents.clone(), Arc::new(LetterFrequencyEmbedder))
                .with_max_chunks(1);
        let chunks = builder.build("zzzz").await.unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].location.as_deref(), Some("page 2"));
    }

    #[tokio::test]
    async fn test_reingest_doubles_chunk_count() {
        let pipeline = test_pipeline("");
        let segments = vec![page("some page text", 1)];

        let first = pipeline
            .index_segments(
                &pipeline.documents,
                "a.pdf",
                "a",
                &segments,
                SplitConfig::document(),
            )
            .await
            .unwrap();
        pipeline
            .index_segments(
                &pipeline.documents,
                "a.pdf",
                "a",
                &segments,
                SplitConfig::document(),
            )
            .await
            .unwrap();

        assert_eq!(first.chunks_indexed, 1);
        assert_eq!(pipeline.documents.document_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_empty_source_is_no_content() {
        let pipeline = test_pipeline("");
        let result = pipeline
            .index_segments(
                &pipeline.documents,
                "scan.pdf",
                "scan",
                &[],
                SplitConfig::document(),
            )
            .await;

        assert!(matches!(result, Err(SvarError::NoContent(_))));

        // Whitespace-only segments split to nothing as well.
        let result = pipeline
            .index_segments(
                &pipeline.documents,
                "scan.pdf",
                "scan",
                &[page("   \n\n ", 1)],
                SplitConfig::document(),
            )
            .await;
        assert!(matches!(result, Err(SvarError::NoContent(_))));
    }

    #[tokio::test]
    async fn test_retrieval_separates_sources() {
        let pipeline = test_pipeline("");
        pipeline
            .index_segments(
                &pipeline.documents,
                "cats.pdf",
                "cats",
                &[page("cat cat cat cat cat", 1)],
                SplitConfig::document(),
            )
            .await
            .unwrap();
        pipeline
            .index_segments(
                &pipeline.documents,
                "dogs.pdf",
                "dogs",
                &[page("dog dog dog dog dog", 1)],
                SplitConfig::document(),
            )
            .await
            .unwrap();

        let results = pipeline.search("dog", 1, 0.0).await.unwrap();
        assert_eq!(results[0].document.source_id, "dogs.pdf");
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let pipeline = test_pipeline("");
        let segments: Vec<SourceSegment> =
            (1..=6).map(|i| page(&format!("page {} words", i), i)).collect();
        pipeline
            .index_segments(
                &pipeline.documents,
                "big.pdf",
                "big",
                &segments,
                SplitConfig::document(),
            )
            .await
            .unwrap();

        let results = pipeline.search("words", 3, 0.0).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_media_accumulates_across_calls() {
        let pipeline = test_pipeline("a short talk about birds");
        let audio = Path::new("/tmp/talk.wav");

        pipeline.ingest_media(audio, "talk", false).await.unwrap();
        pipeline.ingest_media(audio, "talk", false).await.unwrap();

        assert_eq!(pipeline.media.document_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_media_reset_clears_collection() {
        let pipeline = test_pipeline("a short talk about birds");
        let audio = Path::new("/tmp/talk.wav");

        pipeline.ingest_media(audio, "first", false).await.unwrap();
        pipeline.ingest_media(audio, "second", true).await.unwrap();

        let sources = pipeline.media_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].source_id, "second");
    }

    #[tokio::test]
    async fn test_media_and_documents_stay_separate() {
        let pipeline = test_pipeline("spoken words in a recording");
        pipeline
            .index_segments(
                &pipeline.documents,
                "doc.pdf",
                "doc",
                &[page("written words on a page", 1)],
                SplitConfig::document(),
            )
            .await
            .unwrap();
        pipeline
            .ingest_media(Path::new("/tmp/talk.wav"), "talk", false)
            .await
            .unwrap();

        assert_eq!(pipeline.documents.document_count().await.unwrap(), 1);
        assert_eq!(pipeline.media.document_count().await.unwrap(), 1);

        // Document search never sees transcript chunks.
        let results = pipeline.search("recording", 10, 0.0).await.unwrap();
        assert!(results.iter().all(|r| r.document.source_id == "doc.pdf"));
    }

    #[tokio::test]
    async fn test_empty_transcript_is_no_content() {
        let pipeline = test_pipeline("   ");
        let result = pipeline
            .ingest_media(Path::new("/tmp/silence.wav"), "silence", false)
            .await;
        assert!(matches!(result, Err(SvarError::NoContent(_))));
    }
}
