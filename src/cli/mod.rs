//! CLI module for Svar.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Svar - Multimodal Retrieval-Augmented Question Answering
///
/// Index PDFs, web pages, and research papers, transcribe audio and video,
/// and ask questions answered from the indexed content. The name "Svar"
/// comes from the Norwegian word for "answer."
#[derive(Parser, Debug)]
#[command(name = "svar")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Svar and write a default configuration file
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Index a document: a PDF file or a URL
    Add {
        /// PDF file path or http(s) URL
        input: String,

        /// Treat the PDF as a research paper and parse it through Grobid
        #[arg(long)]
        paper: bool,
    },

    /// Ask a question answered from the indexed documents
    Ask {
        /// The question to ask
        question: String,

        /// LLM model to use for response generation
        #[arg(short, long)]
        model: Option<String>,

        /// Number of context chunks to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Transcribe an audio file and answer a question about it
    Audio {
        /// Audio file path
        file: PathBuf,

        /// The question to ask about the recording
        query: String,

        /// Clear previously indexed transcripts first
        #[arg(long)]
        reset: bool,
    },

    /// Extract audio from a video file, transcribe it, and answer a question
    Video {
        /// Video file path
        file: PathBuf,

        /// The question to ask about the recording
        query: String,

        /// Clear previously indexed transcripts first
        #[arg(long)]
        reset: bool,
    },

    /// Search indexed documents without generating an answer
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Minimum similarity score (0.0-1.0)
        #[arg(short, long, default_value = "0.0")]
        min_score: f32,
    },

    /// List indexed sources
    List,

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "rag.model")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
