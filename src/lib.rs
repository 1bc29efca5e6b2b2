//! Svar - Multimodal Retrieval-Augmented Question Answering
//!
//! A CLI tool for indexing documents and media into a searchable vector store
//! and answering questions against them.
//!
//! The name "Svar" comes from the Norwegian/Scandinavian word for "answer."
//!
//! # Overview
//!
//! Svar allows you to:
//! - Index PDFs, web pages, and Grobid-parsed research papers
//! - Transcribe local audio and video files and query their content
//! - Ask questions and get AI-powered answers grounded in your sources
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `loaders` - Text extraction from PDFs, web pages, and research papers
//! - `audio` - Audio extraction and resampling via ffmpeg
//! - `transcription` - Speech-to-text transcription
//! - `chunking` - Text splitting into overlapping chunks
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `rag` - RAG engine for question answering
//! - `pipeline` - Ingestion and query coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use svar::config::Settings;
//! use svar::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::init(settings).await?;
//!
//!     let result = pipeline.add_pdf(std::path::Path::new("paper.pdf")).await?;
//!     println!("Indexed {} chunks", result.chunks_indexed);
//!
//!     let response = pipeline.ask("What is the main contribution?", None, None).await?;
//!     println!("{}", response.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod loaders;
pub mod openai;
pub mod pipeline;
pub mod rag;
pub mod transcription;
pub mod vector_store;

pub use error::{Result, SvarError};
