//! OpenAI configuration

use ragchat_core::SessionConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";

/// Configuration for the OpenAI client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub api_url: String,
    pub chat_model: String,
    pub embedding_model: String,
}

impl OpenAiConfig {
    /// Create configuration with explicit values
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            chat_model: crate::OpenAiClient::GPT_3_5_TURBO.to_string(),
            embedding_model: crate::OpenAiClient::TEXT_EMBEDDING_ADA_002.to_string(),
        }
    }

    /// Create configuration from the session's OpenAI key
    pub fn from_session(config: &SessionConfig) -> Self {
        Self::new(config.openai_api_key.clone())
    }

    /// Point the client at a different API root (proxies, tests)
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }
}
