//! Audio and video commands - transcribe media and answer a question about it.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::{MediaRagResult, Pipeline};
use anyhow::Result;
use std::path::Path;

/// Run the audio command.
pub async fn run_audio(file: &Path, query: &str, reset: bool, settings: Settings) -> Result<()> {
    let pipeline = prepare(&settings).await?;

    let spinner = Output::spinner("Transcribing and indexing...");
    let result = pipeline.audio_rag(file, query, reset).await;
    spinner.finish_and_clear();

    report(result)
}

/// Run the video command.
pub async fn run_video(file: &Path, query: &str, reset: bool, settings: Settings) -> Result<()> {
    let pipeline = prepare(&settings).await?;

    let spinner = Output::spinner("Extracting audio, transcribing, and indexing...");
    let result = pipeline.video_rag(file, query, reset).await;
    spinner.finish_and_clear();

    report(result)
}

async fn prepare(settings: &Settings) -> Result<Pipeline> {
    if let Err(e) = preflight::check(Operation::Media, settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    Ok(Pipeline::init(settings.clone()).await?)
}

fn report(result: crate::error::Result<MediaRagResult>) -> Result<()> {
    match result {
        Ok(media) => {
            Output::success(&format!(
                "Indexed '{}' ({} transcript chunks)",
                media.ingest.title, media.ingest.chunks_indexed
            ));

            println!("\n{}\n", media.response.answer);

            if !media.response.sources.is_empty() {
                Output::header("Transcript excerpts");
                for source in &media.response.sources {
                    Output::search_result(
                        &source.source_title,
                        source.location.as_deref(),
                        source.score,
                        &source.content,
                    );
                }
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("{}", e));
            Err(e.into())
        }
    }
}
