//! Configuration settings for Svar.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub loaders: LoaderSettings,
    pub transcription: TranscriptionSettings,
    pub vector_store: VectorStoreSettings,
    pub rag: RagSettings,
    pub prompts: PromptSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Directory for temporary files (extracted audio, converted WAVs).
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.svar".to_string(),
            temp_dir: "/tmp/svar".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai).
    pub provider: String,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Text splitting settings.
///
/// Documents and transcripts use different chunk geometry: transcripts have
/// no structural separators, so smaller chunks retrieve better.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Chunk size in characters for documents and web pages.
    pub document_chunk_size: usize,
    /// Chunk overlap in characters for documents and web pages.
    pub document_chunk_overlap: usize,
    /// Chunk size in characters for audio/video transcripts.
    pub transcript_chunk_size: usize,
    /// Chunk overlap in characters for audio/video transcripts.
    pub transcript_chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            document_chunk_size: 1000,
            document_chunk_overlap: 200,
            transcript_chunk_size: 500,
            transcript_chunk_overlap: 50,
        }
    }
}

/// Settings for document loaders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Base URL of a locally reachable Grobid instance.
    pub grobid_url: String,
    /// Timeout in seconds for URL fetches and Grobid calls.
    pub http_timeout_seconds: u64,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            grobid_url: "http://localhost:8070".to_string(),
            http_timeout_seconds: 60,
        }
    }
}

/// Transcription provider type.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionProvider {
    /// Local whisper.cpp CLI with a downloaded model (default).
    #[default]
    Local,
    /// OpenAI Whisper API.
    Api,
}

impl std::str::FromStr for TranscriptionProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "whisper-cpp" => Ok(TranscriptionProvider::Local),
            "api" | "openai" => Ok(TranscriptionProvider::Api),
            _ => Err(format!("Unknown transcription provider: {}", s)),
        }
    }
}

impl std::fmt::Display for TranscriptionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptionProvider::Local => write!(f, "local"),
            TranscriptionProvider::Api => write!(f, "api"),
        }
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Transcription provider (local, api).
    pub provider: TranscriptionProvider,
    /// Whisper model size for the local provider (tiny, base, small, medium, large).
    pub model: String,
    /// Explicit path to a ggml model file. Defaults to
    /// `<data_dir>/models/ggml-<model>.bin` when unset.
    pub model_path: Option<String>,
    /// Name of the whisper.cpp binary.
    pub binary: String,
    /// Model name for the API provider.
    pub api_model: String,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            provider: TranscriptionProvider::Local,
            model: "small".to_string(),
            model_path: None,
            binary: "whisper-cli".to_string(),
            api_model: "whisper-1".to_string(),
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Vector store provider (memory, sqlite).
    ///
    /// The memory provider is ephemeral: indexed content is lost when the
    /// process exits.
    pub provider: String,
    /// Path to the SQLite database for the document collection (sqlite provider).
    pub sqlite_path: String,
    /// Path to the SQLite database for the media collection (sqlite provider).
    pub media_sqlite_path: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: "memory".to_string(),
            sqlite_path: "~/.svar/documents.db".to_string(),
            media_sqlite_path: "~/.svar/media.db".to_string(),
        }
    }
}

/// RAG (Retrieval-Augmented Generation) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// LLM model for response generation.
    pub model: String,
    /// Default number of context chunks to retrieve.
    pub top_k: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            top_k: 3,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}


impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SvarError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("svar")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Get the expanded SQLite database path for the document collection.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.sqlite_path)
    }

    /// Get the expanded SQLite database path for the media collection.
    pub fn media_sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.media_sqlite_path)
    }

    /// Resolve the local whisper model path.
    pub fn whisper_model_path(&self) -> PathBuf {
        match &self.transcription.model_path {
            Some(p) => Self::expand_path(p),
            None => self
                .data_dir()
                .join("models")
                .join(format!("ggml-{}.bin", self.transcription.model)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chunk_geometry() {
        let settings = Settings::default();
        assert_eq!(settings.chunking.document_chunk_size, 1000);
        assert_eq!(settings.chunking.document_chunk_overlap, 200);
        assert_eq!(settings.chunking.transcript_chunk_size, 500);
        assert_eq!(settings.chunking.transcript_chunk_overlap, 50);
    }

    #[test]
    fn test_whisper_model_path_resolution() {
        let mut settings = Settings::default();
        settings.general.data_dir = "/data".to_string();
        assert_eq!(
            settings.whisper_model_path(),
            PathBuf::from("/data/models/ggml-small.bin")
        );

        settings.transcription.model_path = Some("/models/custom.bin".to_string());
        assert_eq!(
            settings.whisper_model_path(),
            PathBuf::from("/models/custom.bin")
        );
    }

    #[test]
    fn test_partial_config_parses() {
        let toml_str = r#"
            [rag]
            model = "gpt-4o"
            top_k = 5
        "#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.rag.model, "gpt-4o");
        assert_eq!(settings.rag.top_k, 5);
        assert_eq!(settings.embedding.model, "text-embedding-3-small");
    }
}
