//! Retrieval-augmented query and ingestion collaborator traits

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{ChatTurn, Result, SourceDocument};

/// Input to a query processor: the new question plus all prior turns
#[derive(Debug, Clone, Copy)]
pub struct QueryInput<'a> {
    pub question: &'a str,
    pub chat_history: &'a [ChatTurn],
}

/// Answer produced by a query processor together with its supporting documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub answer: String,
    pub source_documents: Vec<SourceDocument>,
}

/// Answers a question given the conversation so far
#[async_trait]
pub trait QueryProcessor: Send + Sync {
    async fn process(&self, input: QueryInput<'_>) -> Result<QueryResult>;
}

/// Builds the vector store from the document collection
#[async_trait]
pub trait Ingestor: Send + Sync {
    /// Run ingestion and return a human-readable status line
    async fn ingest(&self) -> Result<String>;
}
