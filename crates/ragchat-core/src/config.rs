//! Session configuration loaded from the environment

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

/// Namespace inside the remote index that holds the ingested documents
pub const DEFAULT_NAMESPACE: &str = "testing-pdf-0001";

/// Sampling temperature for answers
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Number of source documents retrieved and cited per answer
pub const DEFAULT_SOURCE_AMOUNT: usize = 4;

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const PINECONE_API_KEY_VAR: &str = "PINECONE_API_KEY";
pub const PINECONE_ENVIRONMENT_VAR: &str = "PINECONE_ENVIRONMENT";
pub const PINECONE_INDEX_VAR: &str = "PINECONE_INDEX";

/// Which vector store backs the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Backend {
    /// Remote managed Pinecone index
    Pinecone,
    /// Local on-disk store
    Local,
}

impl Backend {
    /// Decide the backend from the answer to the "use Pinecone?" prompt.
    ///
    /// Only the exact answer `"Y"` together with a non-empty API key selects
    /// Pinecone; everything else, including lowercase `"y"`, falls back to
    /// the local store.
    pub fn from_answer(answer: &str, pinecone_api_key: &str) -> Self {
        if answer == "Y" && !pinecone_api_key.is_empty() {
            Backend::Pinecone
        } else {
            Backend::Local
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Backend::Pinecone)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Pinecone => write!(f, "Pinecone"),
            Backend::Local => write!(f, "local store"),
        }
    }
}

/// Immutable settings for one chat session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub openai_api_key: String,
    pub pinecone_api_key: String,
    pub pinecone_environment: String,
    pub pinecone_index: String,
    pub namespace: String,
    pub temperature: f32,
    pub source_amount: usize,
    pub backend: Backend,
}

impl SessionConfig {
    /// Create configuration from environment variables, loading `.env` first.
    ///
    /// Missing variables become empty strings; nothing is validated here.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).unwrap_or_default();

        Self {
            openai_api_key: var(OPENAI_API_KEY_VAR),
            pinecone_api_key: var(PINECONE_API_KEY_VAR),
            pinecone_environment: var(PINECONE_ENVIRONMENT_VAR),
            pinecone_index: var(PINECONE_INDEX_VAR),
            namespace: DEFAULT_NAMESPACE.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            source_amount: DEFAULT_SOURCE_AMOUNT,
            backend: Backend::Local,
        }
    }

    /// Return a copy of this configuration bound to the given backend
    pub fn with_backend(&self, backend: Backend) -> Self {
        Self {
            backend,
            ..self.clone()
        }
    }

    pub fn has_pinecone_key(&self) -> bool {
        !self.pinecone_api_key.is_empty()
    }
}
