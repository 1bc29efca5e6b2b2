//! Add command - index a PDF, web page, or research paper.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::SvarError;
use crate::pipeline::Pipeline;
use anyhow::Result;
use std::path::Path;

/// Run the add command. URLs are fetched as web pages; file paths are read
/// as PDFs, through Grobid when `--paper` is set.
pub async fn run_add(input: &str, paper: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ingest, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let pipeline = Pipeline::init(settings).await?;

    let spinner = Output::spinner(&format!("Indexing {}...", input));

    let result = if input.starts_with("http://") || input.starts_with("https://") {
        pipeline.add_url(input).await
    } else if paper {
        pipeline.add_research_paper(Path::new(input)).await
    } else {
        pipeline.add_pdf(Path::new(input)).await
    };

    spinner.finish_and_clear();

    match result {
        Ok(ingest) => {
            Output::success(&format!(
                "Indexed '{}' ({} chunks)",
                ingest.title, ingest.chunks_indexed
            ));
            Ok(())
        }
        Err(e @ SvarError::NoContent(_)) => {
            Output::error(&format!("Failed to index {}: no extractable text", input));
            Err(e.into())
        }
        Err(e) => {
            Output::error(&format!("Failed to index {}: {}", input, e));
            Err(e.into())
        }
    }
}
