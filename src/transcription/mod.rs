//! Speech-to-text transcription.
//!
//! Two providers implement [`Transcriber`]:
//!
//! - **Local** (default): runs the whisper.cpp CLI against a downloaded GGML
//!   model, entirely offline.
//! - **Api**: sends the audio to OpenAI's hosted Whisper endpoint.

mod api;
mod local;

pub use api::ApiWhisperTranscriber;
pub use local::LocalWhisperTranscriber;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file and return segments with timestamps.
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript>;
}

/// A complete transcript with timestamped segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Identifier of the transcribed media (file stem of the source).
    pub source_id: String,
    /// Individual transcript segments with timestamps.
    pub segments: Vec<TranscriptSegment>,
    /// Full transcript text (concatenated segments).
    pub full_text: String,
    /// Total duration in seconds.
    pub duration_seconds: f64,
}

impl Transcript {
    /// Create a transcript from segments, deriving full text and duration.
    pub fn new(source_id: String, segments: Vec<TranscriptSegment>) -> Self {
        let full_text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let duration_seconds = segments.last().map(|s| s.end_seconds).unwrap_or(0.0);

        Self {
            source_id,
            segments,
            full_text,
            duration_seconds,
        }
    }
}

/// A single timestamped segment of a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds.
    pub start_seconds: f64,
    /// End time in seconds.
    pub end_seconds: f64,
    /// Segment text.
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start_seconds: f64, end_seconds: f64, text: String) -> Self {
        Self {
            start_seconds,
            end_seconds,
            text,
        }
    }
}

/// Derive a media identifier from a file path (the file stem).
pub(crate) fn source_id_for(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_derives_full_text_and_duration() {
        let transcript = Transcript::new(
            "talk".to_string(),
            vec![
                TranscriptSegment::new(0.0, 2.5, "Hello there.".to_string()),
                TranscriptSegment::new(2.5, 5.0, "Welcome back.".to_string()),
            ],
        );

        assert_eq!(transcript.full_text, "Hello there. Welcome back.");
        assert_eq!(transcript.duration_seconds, 5.0);
    }

    #[test]
    fn test_empty_transcript() {
        let transcript = Transcript::new("talk".to_string(), vec![]);
        assert_eq!(transcript.full_text, "");
        assert_eq!(transcript.duration_seconds, 0.0);
    }

    #[test]
    fn test_source_id_from_path() {
        assert_eq!(source_id_for(Path::new("/tmp/lecture_01.mp3")), "lecture_01");
    }
}
