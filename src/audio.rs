//! Audio extraction and conversion via ffmpeg.
//!
//! Video files are reduced to a mono 16 kHz WAV track before transcription,
//! which is the input format speech recognition expects.

use crate::error::{Result, SvarError};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// File name for the audio track extracted from a video.
pub const EXTRACTED_AUDIO_FILENAME: &str = "audio_from_video.wav";

/// Extracts the audio track from a video file into `temp_dir`.
///
/// The output is always written to the same file name inside `temp_dir`, so
/// a later extraction overwrites an earlier one.
#[instrument(skip_all, fields(video = %video_path.display()))]
pub async fn extract_audio(video_path: &Path, temp_dir: &Path) -> Result<PathBuf> {
    if !video_path.exists() {
        return Err(SvarError::MediaNotFound(
            video_path.display().to_string(),
        ));
    }

    std::fs::create_dir_all(temp_dir)?;
    let output_path = temp_dir.join(EXTRACTED_AUDIO_FILENAME);

    info!("Extracting audio track from {}", video_path.display());
    convert_to_wav16k(video_path, &output_path).await?;

    Ok(output_path)
}

/// Converts any ffmpeg-readable media file to mono 16 kHz WAV.
pub async fn convert_to_wav16k(source: &Path, dest: &Path) -> Result<()> {
    debug!("Converting {:?} to 16 kHz mono WAV", source);

    let result = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i").arg(source)
        .arg("-vn")
        .arg("-ac").arg("1")
        .arg("-ar").arg("16000")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(SvarError::ToolFailed(format!("ffmpeg failed: {err}")))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SvarError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(SvarError::AudioExtraction(format!("ffmpeg error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_video_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let result = extract_audio(Path::new("/nonexistent/clip.mp4"), dir.path()).await;
        assert!(matches!(result, Err(SvarError::MediaNotFound(_))));
    }

    #[tokio::test]
    async fn test_output_path_is_fixed() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        std::fs::write(&video, b"not a real video").unwrap();

        // ffmpeg either fails on the garbage input or is absent; in both
        // cases the error should be a tool error, not a missing-media error.
        let result = extract_audio(&video, dir.path()).await;
        assert!(matches!(
            result,
            Err(SvarError::ToolFailed(_)) | Err(SvarError::ToolNotFound(_))
        ));
    }
}
