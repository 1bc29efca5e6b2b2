//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use crate::error::SvarError;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, mut settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            apply_set(&mut settings, key, value)?;
            settings.save()?;
            Output::success(&format!("Set {} = {}", key, value));
            Output::info(&format!(
                "Saved to {}",
                Settings::default_config_path().display()
            ));
        }

        ConfigAction::Edit => {
            let config_path = Settings::default_config_path();

            // Create default config if it doesn't exist
            if !config_path.exists() {
                settings.save()?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(&config_path)
                .status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            let config_path = Settings::default_config_path();
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Apply a `section.key = value` assignment to the settings.
fn apply_set(settings: &mut Settings, key: &str, value: &str) -> crate::error::Result<()> {
    match key {
        "general.data_dir" => settings.general.data_dir = value.to_string(),
        "general.temp_dir" => settings.general.temp_dir = value.to_string(),
        "general.log_level" => settings.general.log_level = value.to_string(),

        "embedding.model" => settings.embedding.model = value.to_string(),
        "embedding.dimensions" => settings.embedding.dimensions = parse_number(key, value)?,

        "chunking.document_chunk_size" => {
            settings.chunking.document_chunk_size = parse_number(key, value)?
        }
        "chunking.document_chunk_overlap" => {
            settings.chunking.document_chunk_overlap = parse_number(key, value)?
        }
        "chunking.transcript_chunk_size" => {
            settings.chunking.transcript_chunk_size = parse_number(key, value)?
        }
        "chunking.transcript_chunk_overlap" => {
            settings.chunking.transcript_chunk_overlap = parse_number(key, value)?
        }

        "loaders.grobid_url" => settings.loaders.grobid_url = value.to_string(),
        "loaders.http_timeout_seconds" => {
            settings.loaders.http_timeout_seconds = parse_number(key, value)?
        }

        "transcription.provider" => {
            settings.transcription.provider = value.parse().map_err(SvarError::InvalidInput)?
        }
        "transcription.model" => settings.transcription.model = value.to_string(),
        "transcription.model_path" => {
            settings.transcription.model_path = Some(value.to_string())
        }
        "transcription.binary" => settings.transcription.binary = value.to_string(),
        "transcription.api_model" => settings.transcription.api_model = value.to_string(),

        "vector_store.provider" => match value {
            "memory" | "sqlite" => settings.vector_store.provider = value.to_string(),
            other => {
                return Err(SvarError::InvalidInput(format!(
                    "Unknown vector store provider: {} (expected memory or sqlite)",
                    other
                )));
            }
        },
        "vector_store.sqlite_path" => settings.vector_store.sqlite_path = value.to_string(),
        "vector_store.media_sqlite_path" => {
            settings.vector_store.media_sqlite_path = value.to_string()
        }

        "rag.model" => settings.rag.model = value.to_string(),
        "rag.top_k" => settings.rag.top_k = parse_number(key, value)?,

        "prompts.custom_dir" => settings.prompts.custom_dir = Some(value.to_string()),

        other => {
            return Err(SvarError::InvalidInput(format!(
                "Unknown config key: {} (see 'svar config show' for available keys)",
                other
            )));
        }
    }

    Ok(())
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> crate::error::Result<T> {
    value
        .parse()
        .map_err(|_| SvarError::InvalidInput(format!("{} expects a number, got '{}'", key, value)))
}
