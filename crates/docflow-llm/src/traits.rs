//! Seams between the pipeline and the model services.

use crate::client::OllamaClient;
use crate::error::{LlmError, LlmResult};
use crate::gemini::GeminiClient;
use crate::types::GenerateRequest;
use async_trait::async_trait;

/// Text-in, text-out model call.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> LlmResult<String>;
}

/// Text-in, vector-out model call.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_text(&self, text: &str) -> LlmResult<Vec<f32>>;
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> LlmResult<String> {
        self.generate_content(prompt).await
    }
}

/// Answers prompts with a fixed Ollama model.
#[derive(Clone)]
pub struct OllamaGenerator {
    client: OllamaClient,
    model: String,
}

impl OllamaGenerator {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate_text(&self, prompt: &str) -> LlmResult<String> {
        let reply = self
            .client
            .generate(GenerateRequest::new(&self.model, prompt))
            .await?;
        reply.response.ok_or(LlmError::EmptyResponse)
    }
}

/// Embeds text with a fixed Ollama model.
#[derive(Clone)]
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed_text(&self, text: &str) -> LlmResult<Vec<f32>> {
        self.client.embed(&self.model, text).await
    }
}
