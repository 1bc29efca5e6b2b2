//! Local transcription through the whisper.cpp CLI.

use super::{source_id_for, Transcriber, Transcript, TranscriptSegment};
use crate::audio::convert_to_wav16k;
use crate::error::{Result, SvarError};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Transcriber backed by a local whisper.cpp binary and GGML model file.
pub struct LocalWhisperTranscriber {
    binary: String,
    model_path: PathBuf,
}

/// Top-level shape of whisper.cpp's `-oj` JSON output.
#[derive(Debug, Deserialize)]
struct WhisperCliOutput {
    transcription: Vec<WhisperCliSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperCliSegment {
    offsets: WhisperCliOffsets,
    text: String,
}

/// Segment offsets in milliseconds.
#[derive(Debug, Deserialize)]
struct WhisperCliOffsets {
    from: u64,
    to: u64,
}

impl LocalWhisperTranscriber {
    /// Create a transcriber for the given binary name and model file.
    pub fn new(binary: impl Into<String>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            model_path: model_path.into(),
        }
    }

    /// Run the whisper.cpp CLI on a 16 kHz mono WAV and parse its JSON output.
    async fn run_whisper(&self, wav_path: &Path, output_prefix: &Path) -> Result<Vec<TranscriptSegment>> {
        let result = Command::new(&self.binary)
            .arg("-m").arg(&self.model_path)
            .arg("-f").arg(wav_path)
            .arg("-oj")
            .arg("-of").arg(output_prefix)
            .arg("-np")
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SvarError::ToolNotFound(self.binary.clone()));
            }
            Err(e) => {
                return Err(SvarError::Transcription(format!(
                    "{} execution failed: {e}",
                    self.binary
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SvarError::ToolFailed(format!(
                "{} failed: {stderr}",
                self.binary
            )));
        }

        let json_path = output_prefix.with_extension("json");
        let json = tokio::fs::read_to_string(&json_path).await?;
        let parsed: WhisperCliOutput = serde_json::from_str(&json)
            .map_err(|e| SvarError::Transcription(format!("Invalid whisper output: {e}")))?;

        Ok(parsed
            .transcription
            .into_iter()
            .map(|s| {
                TranscriptSegment::new(
                    s.offsets.from as f64 / 1000.0,
                    s.offsets.to as f64 / 1000.0,
                    s.text.trim().to_string(),
                )
            })
            .filter(|s| !s.text.is_empty())
            .collect())
    }
}

#[async_trait]
impl Transcriber for LocalWhisperTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        if !audio_path.exists() {
            return Err(SvarError::MediaNotFound(audio_path.display().to_string()));
        }
        if !self.model_path.exists() {
            return Err(SvarError::Transcription(format!(
                "Model file not found at {}. Download a GGML whisper model first.",
                self.model_path.display()
            )));
        }

        let temp_dir = tempfile::tempdir()?;
        let wav_path = temp_dir.path().join("input.wav");
        convert_to_wav16k(audio_path, &wav_path).await?;

        info!("Transcribing with {}", self.binary);
        let output_prefix = temp_dir.path().join("transcript");
        let segments = self.run_whisper(&wav_path, &output_prefix).await?;
        debug!("Transcribed {} segments", segments.len());

        Ok(Transcript::new(source_id_for(audio_path), segments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whisper_json() {
        let json = r#"{
            "transcription": [
                {"offsets": {"from": 0, "to": 3200}, "text": " Hello everyone."},
                {"offsets": {"from": 3200, "to": 7500}, "text": " Today we talk about birds."},
                {"offsets": {"from": 7500, "to": 7600}, "text": "  "}
            ]
        }"#;

        let parsed: WhisperCliOutput = serde_json::from_str(json).unwrap();
        let segments: Vec<TranscriptSegment> = parsed
            .transcription
            .into_iter()
            .map(|s| {
                TranscriptSegment::new(
                    s.offsets.from as f64 / 1000.0,
                    s.offsets.to as f64 / 1000.0,
                    s.text.trim().to_string(),
                )
            })
            .filter(|s| !s.text.is_empty())
            .collect();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start_seconds, 0.0);
        assert_eq!(segments[0].end_seconds, 3.2);
        assert_eq!(segments[0].text, "Hello everyone.");
        assert_eq!(segments[1].start_seconds, 3.2);
    }

    #[tokio::test]
    async fn test_missing_audio_is_reported() {
        let transcriber = LocalWhisperTranscriber::new("whisper-cli", "/tmp/model.bin");
        let result = transcriber.transcribe(Path::new("/nonexistent/talk.mp3")).await;
        assert!(matches!(result, Err(SvarError::MediaNotFound(_))));
    }

    #[tokio::test]
    async fn test_missing_model_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("talk.mp3");
        std::fs::write(&audio, b"fake audio").unwrap();

        let transcriber =
            LocalWhisperTranscriber::new("whisper-cli", "/nonexistent/ggml-small.bin");
        let result = transcriber.transcribe(&audio).await;
        assert!(matches!(result, Err(SvarError::Transcription(_))));
    }
}
