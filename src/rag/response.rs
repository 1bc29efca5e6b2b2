//! RAG response generation.

use super::{context::format_context_for_prompt, ContextBuilder, ContextChunk};
use crate::config::Prompts;
use crate::embedding::Embedder;
use crate::error::{Result, SvarError};
use crate::openai::create_client;
use crate::vector_store::VectorStore;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// RAG engine for question answering.
pub struct RagEngine {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    context_builder: ContextBuilder,
    prompts: Prompts,
    system_template: String,
    user_template: String,
}

impl RagEngine {
    /// Create a new RAG engine with the default document prompts.
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        model: &str,
        max_context_chunks: usize,
    ) -> Self {
        let context_builder =
            ContextBuilder::new(vector_store, embedder).with_max_chunks(max_context_chunks);

        let prompts = Prompts::default();
        let system_template = prompts.rag.system.clone();
        let user_template = prompts.rag.user.clone();

        Self {
            client: create_client(),
            model: model.to_string(),
            context_builder,
            prompts,
            system_template,
            user_template,
        }
    }

    /// Set the prompt collection (for user-defined variables and overrides).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.system_template = prompts.rag.system.clone();
        self.user_template = prompts.rag.user.clone();
        self.prompts = prompts;
        self
    }

    /// Select a specific system/user template pair, e.g. the media prompts.
    pub fn with_templates(mut self, system: String, user: String) -> Self {
        self.system_template = system;
        self.user_template = user;
        self
    }

    /// Ask a question and get an answer with its supporting chunks.
    ///
    /// The model is called even when retrieval finds nothing; it then answers
    /// from an empty context, which the prompt instructs it to admit.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn ask(&self, question: &str) -> Result<RagResponse> {
        info!("Processing question");

        let context_chunks = self.context_builder.build(question).await?;
        let context_text = format_context_for_prompt(&context_chunks);

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), context_text);

        let user_prompt = self.prompts.render_with_custom(&self.user_template, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_template.clone())
                .build()
                .map_err(|e| SvarError::Rag(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| SvarError::Rag(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.7)
            .build()
            .map_err(|e| SvarError::Rag(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SvarError::OpenAI(format!("Failed to generate response: {}", e)))?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| SvarError::Rag("Empty response from LLM".to_string()))?
            .clone();

        debug!("Generated response with {} sources", context_chunks.len());

        Ok(RagResponse {
            answer,
            sources: context_chunks,
        })
    }
}

/// A RAG response with answer and sources.
#[derive(Debug, Clone)]
pub struct RagResponse {
    /// The generated answer.
    pub answer: String,
    /// Chunks the answer was grounded in.
    pub sources: Vec<ContextChunk>,
}

impl RagResponse {
    /// Format the response for display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer.clone();

        if !self.sources.is_empty() {
            output.push_str("\n\n--- Sources ---\n");
            for source in &self.sources {
                let location_part = source
                    .location
                    .as_ref()
                    .map(|l| format!(", {}", l))
                    .unwrap_or_default();
                output.push_str(&format!(
                    "\n{}{} (score: {:.2})",
                    source.source_title, location_part, source.score
                ));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_display_lists_sources() {
        let response = RagResponse {
            answer: "Forty-two.".to_string(),
            sources: vec![ContextChunk {
                source_id: "guide.pdf".to_string(),
                source_title: "guide".to_string(),
                location: Some("page 7".to_string()),
                content: "the answer is forty-two".to_string(),
                score: 0.88,
            }],
        };

        let display = response.format_for_display();
        assert!(display.starts_with("Forty-two."));
        assert!(display.contains("guide, page 7 (score: 0.88)"));
    }

    #[test]
    fn test_response_display_without_sources() {
        let response = RagResponse {
            answer: "I don't know.".to_string(),
            sources: vec![],
        };
        assert_eq!(response.format_for_display(), "I don't know.");
    }
}
