//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::{Settings, TranscriptionProvider};
use crate::error::{Result, SvarError};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Indexing documents requires the embedding API key.
    Ingest,
    /// Asking questions requires the API key.
    Ask,
    /// Media questions additionally require ffmpeg and, for the local
    /// provider, the whisper binary.
    Media,
    /// Search requires only the embedding API key.
    Search,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Ingest | Operation::Ask | Operation::Search => {
            check_api_key()?;
        }
        Operation::Media => {
            check_api_key()?;
            check_tool("ffmpeg")?;
            if settings.transcription.provider == TranscriptionProvider::Local {
                check_tool(&settings.transcription.binary)?;
                let model_path = settings.whisper_model_path();
                if !model_path.exists() {
                    return Err(SvarError::Config(format!(
                        "Whisper model not found at {}. Download a GGML model there, \
                         or set transcription.model_path.",
                        model_path.display()
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(SvarError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(SvarError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    // ffmpeg uses -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(SvarError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SvarError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(SvarError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_is_reported() {
        let result = check_tool("definitely-not-a-real-tool-name");
        assert!(matches!(result, Err(SvarError::ToolNotFound(_))));
    }
}
