//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for ingestion, search, and question answering.

use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state: the pipeline is built once at startup.
struct AppState {
    pipeline: Pipeline,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let pipeline = Pipeline::init(settings).await?;

    let state = Arc::new(AppState { pipeline });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/ingest", post(ingest))
        .route("/search", post(search))
        .route("/ask", post(ask))
        .route("/media/ask", post(media_ask))
        .route("/sources", get(sources))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Svar API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Ingest", "POST /ingest");
    Output::kv("Search", "POST /search");
    Output::kv("Ask (documents)", "POST /ask");
    Output::kv("Ask (media)", "POST /media/ask");
    Output::kv("List sources", "GET  /sources");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct IngestRequest {
    /// PDF file path (on the server) or http(s) URL
    input: String,
    /// Parse the PDF as a research paper through Grobid
    #[serde(default)]
    paper: bool,
}

#[derive(Serialize)]
struct IngestResponse {
    success: bool,
    source_id: String,
    title: String,
    chunks_indexed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    min_score: f32,
}

fn default_limit() -> usize {
    5
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Serialize)]
struct SearchHit {
    source_id: String,
    source_title: String,
    location: Option<String>,
    content: String,
    score: f32,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
    #[serde(default)]
    top_k: Option<usize>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct MediaAskRequest {
    /// Audio or video file path on the server
    file: String,
    query: String,
    /// Clear previously indexed transcripts first
    #[serde(default)]
    reset: bool,
    /// Treat the file as video and extract its audio track first
    #[serde(default)]
    video: bool,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    sources: Vec<SourceInfo>,
}

#[derive(Serialize)]
struct SourceInfo {
    source_id: String,
    source_title: String,
    location: Option<String>,
    score: f32,
    content: String,
}

#[derive(Serialize)]
struct SourcesResponse {
    documents: Vec<crate::vector_store::IndexedSource>,
    media: Vec<crate::vector_store::IndexedSource>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn internal_error(e: impl ToString) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IngestRequest>,
) -> impl IntoResponse {
    let result = if req.input.starts_with("http://") || req.input.starts_with("https://") {
        state.pipeline.add_url(&req.input).await
    } else if req.paper {
        state
            .pipeline
            .add_research_paper(Path::new(&req.input))
            .await
    } else {
        state.pipeline.add_pdf(Path::new(&req.input)).await
    };

    match result {
        Ok(ingest) => Json(IngestResponse {
            success: true,
            source_id: ingest.source_id,
            title: ingest.title,
            chunks_indexed: ingest.chunks_indexed,
            error: None,
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(IngestResponse {
                success: false,
                source_id: String::new(),
                title: String::new(),
                chunks_indexed: 0,
                error: Some(e.to_string()),
            }),
        )
            .into_response(),
    }
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> impl IntoResponse {
    match state
        .pipeline
        .search(&req.query, req.limit, req.min_score)
        .await
    {
        Ok(results) => Json(SearchResponse {
            results: results
                .into_iter()
                .map(|r| SearchHit {
                    location: r.document.location(),
                    source_id: r.document.source_id,
                    source_title: r.document.source_title,
                    content: r.document.content,
                    score: r.score,
                })
                .collect(),
        })
        .into_response(),
        Err(e) => internal_error(e),
    }
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> impl IntoResponse {
    match state
        .pipeline
        .ask(&req.question, req.model.as_deref(), req.top_k)
        .await
    {
        Ok(response) => Json(AskResponse {
            answer: response.answer,
            sources: response
                .sources
                .into_iter()
                .map(|s| SourceInfo {
                    source_id: s.source_id,
                    source_title: s.source_title,
                    location: s.location,
                    score: s.score,
                    content: s.content,
                })
                .collect(),
        })
        .into_response(),
        Err(e) => internal_error(e),
    }
}

async fn media_ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MediaAskRequest>,
) -> impl IntoResponse {
    let path = Path::new(&req.file);
    let result = if req.video {
        state.pipeline.video_rag(path, &req.query, req.reset).await
    } else {
        state.pipeline.audio_rag(path, &req.query, req.reset).await
    };

    match result {
        Ok(media) => Json(AskResponse {
            answer: media.response.answer,
            sources: media
                .response
                .sources
                .into_iter()
                .map(|s| SourceInfo {
                    source_id: s.source_id,
                    source_title: s.source_title,
                    location: s.location,
                    score: s.score,
                    content: s.content,
                })
                .collect(),
        })
        .into_response(),
        Err(e) => internal_error(e),
    }
}

async fn sources(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let documents = match state.pipeline.document_sources().await {
        Ok(s) => s,
        Err(e) => return internal_error(e),
    };
    let media = match state.pipeline.media_sources().await {
        Ok(s) => s,
        Err(e) => return internal_error(e),
    };

    Json(SourcesResponse { documents, media }).into_response()
}
