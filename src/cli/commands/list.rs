//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::vector_store::{IndexedSource, SqliteVectorStore, VectorStore};
use anyhow::Result;

/// Run the list command.
///
/// Opens the stores directly instead of building the full pipeline, so
/// listing works without an API key.
pub async fn run_list(settings: Settings) -> Result<()> {
    if settings.vector_store.provider != "sqlite" {
        Output::info(
            "The memory vector store is ephemeral; indexed content only lives for \
             the duration of a single command or server process.",
        );
        Output::info("Set vector_store.provider = \"sqlite\" to persist indexed sources.");
        return Ok(());
    }

    let documents = SqliteVectorStore::new(&settings.sqlite_path())?;
    let media = SqliteVectorStore::new(&settings.media_sqlite_path())?;

    print_sources("Documents", &documents.list_sources().await?);
    print_sources("Media transcripts", &media.list_sources().await?);

    Ok(())
}

fn print_sources(label: &str, sources: &[IndexedSource]) {
    Output::header(&format!("{} ({})", label, sources.len()));
    if sources.is_empty() {
        println!("  (none)");
        return;
    }
    for source in sources {
        Output::source_info(&source.source_title, &source.source_id, source.chunk_count);
    }
}
