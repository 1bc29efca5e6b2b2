//! Prompt templates for Svar.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}


/// Prompts for RAG response generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    /// System prompt for document questions.
    pub system: String,
    /// User prompt template for document questions.
    pub user: String,
    /// System prompt for audio/video transcript questions.
    pub media_system: String,
    /// User prompt template for audio/video transcript questions.
    pub media_user: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: "You are a helpful assistant that answers questions based on the \
                     provided context from the user's indexed documents."
                .to_string(),

            user: r#"Use the following context to answer the question.

Context:
{{context}}

Question: {{question}}
"#
            .to_string(),

            media_system: "You are a helpful assistant. Based on the following context \
                           from an audio transcription, answer the user's question."
                .to_string(),

            media_user: r#"Context:
{{context}}

Question:
{{question}}
"#
            .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.rag.user.contains("{{context}}"));
        assert!(prompts.rag.user.contains("{{question}}"));
        assert!(prompts.rag.media_user.contains("{{context}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Context:\n{{context}}\n\nQuestion: {{question}}";
        let mut vars = std::collections::HashMap::new();
        vars.insert("context".to_string(), "chunk one\n\nchunk two".to_string());
        vars.insert("question".to_string(), "What happened?".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(
            result,
            "Context:\nchunk one\n\nchunk two\n\nQuestion: What happened?"
        );
    }
}
