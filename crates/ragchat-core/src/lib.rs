//! Core traits and types for ragchat
//!
//! This crate defines the session configuration, the chat history and citation
//! types, and the collaborator-facing traits (LLM provider, embedder, vector
//! store, query processor, ingestor) shared across the workspace.

pub mod chat;
pub mod config;
pub mod document;
pub mod error;
pub mod llm;
pub mod rag;
pub mod vector_store;

pub use chat::{ChatHistory, ChatTurn};
pub use config::{Backend, SessionConfig};
pub use document::{Citation, CitationMetadata, Metadata, SourceDocument};
pub use error::{Error, Result};
pub use llm::{ChatMessage, Embedder, GenerationConfig, GenerationResult, LLMProvider, Role};
pub use rag::{Ingestor, QueryInput, QueryProcessor, QueryResult};
pub use vector_store::{ScoredDocument, VectorDocument, VectorStore, cosine_similarity};
