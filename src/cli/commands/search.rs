//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    limit: usize,
    min_score: f32,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let pipeline = Pipeline::init(settings).await?;

    let spinner = Output::spinner("Searching...");
    let results = pipeline.search(query, limit, min_score).await;
    spinner.finish_and_clear();

    match results {
        Ok(results) if results.is_empty() => {
            Output::info("No matching chunks found.");
            Ok(())
        }
        Ok(results) => {
            Output::header(&format!("Results ({})", results.len()));
            for result in &results {
                Output::search_result(
                    &result.document.source_title,
                    result.document.location().as_deref(),
                    result.score,
                    &result.document.content,
                );
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            Err(e.into())
        }
    }
}
