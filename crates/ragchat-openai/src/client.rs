//! OpenAI client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ragchat_core::{
    ChatMessage, Embedder, Error, GenerationConfig, GenerationResult, LLMProvider, Result,
};

use crate::config::OpenAiConfig;

/// Inputs per embeddings request
const EMBEDDING_BATCH_SIZE: usize = 100;

/// OpenAI chat-completion and embeddings client
pub struct OpenAiClient {
    config: OpenAiConfig,
    client: Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: u32,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiClient {
    /// Model constants
    pub const GPT_3_5_TURBO: &'static str = "gpt-3.5-turbo";
    pub const TEXT_EMBEDDING_ADA_002: &'static str = "text-embedding-ada-002";

    /// Create a new OpenAI client from configuration
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ragchat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Set the chat model to use for generation
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.config.chat_model = model_id.into();
        self
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// POST a JSON body and return the raw response text, mapping failures
    /// through `wrap` so chat and embedding errors stay distinguishable.
    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        wrap: fn(String) -> Error,
    ) -> Result<String> {
        let url = format!("{}/{}", self.config.api_url, path);
        debug!(%url, "Sending OpenAI request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(wrap(format!(
                "OpenAI API request failed with status {}: {}",
                status, text
            )));
        }

        Ok(text)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.config.embedding_model,
            input: texts,
        };

        let text = self.post_json("embeddings", &request, Error::Embedding).await?;
        let mut response: EmbeddingResponse = serde_json::from_str(&text)
            .map_err(|e| Error::Embedding(format!("Invalid embeddings response: {}", e)))?;

        if response.data.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                response.data.len()
            )));
        }

        response.data.sort_by_key(|d| d.index);
        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl LLMProvider for OpenAiClient {
    async fn generate_with_config(
        &self,
        messages: &[ChatMessage],
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let request = ChatRequest {
            model: &config.model_id,
            messages,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };

        let text = self
            .post_json("chat/completions", &request, Error::LLMProvider)
            .await?;
        let response: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| Error::LLMProvider(format!("Invalid chat response: {}", e)))?;

        let answer = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::LLMProvider("Empty response from OpenAI".to_string()))?;

        Ok(GenerationResult {
            text: answer,
            model_id: config.model_id.clone(),
            tokens_used: response.usage.map(|u| u.total_tokens),
        })
    }

    fn model_id(&self) -> &str {
        &self.config.chat_model
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(EMBEDDING_BATCH_SIZE) {
            debug!(batch_size = batch.len(), "Embedding batch");
            embeddings.extend(self.embed_batch(batch).await?);
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        match self.config.embedding_model.as_str() {
            "text-embedding-3-large" => 3072,
            _ => 1536,
        }
    }
}
