//! Transcription through OpenAI's hosted Whisper endpoint.

use super::{source_id_for, Transcriber, Transcript, TranscriptSegment};
use crate::error::{Result, SvarError};
use crate::openai::create_client;
use async_openai::types::{AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, instrument};

/// OpenAI Whisper API-based transcriber.
pub struct ApiWhisperTranscriber {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl ApiWhisperTranscriber {
    /// Create a transcriber using the given API model (e.g. `whisper-1`).
    pub fn new(model: &str) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Transcriber for ApiWhisperTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        if !audio_path.exists() {
            return Err(SvarError::MediaNotFound(audio_path.display().to_string()));
        }

        let file_bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let request = CreateTranscriptionRequestArgs::default()
            .file(async_openai::types::AudioInput::from_vec_u8(
                file_name, file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::VerboseJson)
            .build()
            .map_err(|e| SvarError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe_verbose_json(request)
            .await
            .map_err(|e| SvarError::OpenAI(format!("Whisper API error: {}", e)))?;

        let segments: Vec<TranscriptSegment> = response
            .segments
            .map(|segs| {
                segs.iter()
                    .map(|s| {
                        TranscriptSegment::new(
                            s.start as f64,
                            s.end as f64,
                            s.text.trim().to_string(),
                        )
                    })
                    .collect()
            })
            .unwrap_or_else(|| {
                // Fallback: single segment covering the whole file
                vec![TranscriptSegment::new(
                    0.0,
                    response.duration as f64,
                    response.text.trim().to_string(),
                )]
            });

        debug!("Transcribed {} segments", segments.len());
        Ok(Transcript::new(source_id_for(audio_path), segments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_audio_is_reported() {
        let transcriber = ApiWhisperTranscriber::new("whisper-1");
        let result = transcriber.transcribe(Path::new("/nonexistent/talk.wav")).await;
        assert!(matches!(result, Err(SvarError::MediaNotFound(_))));
    }
}
