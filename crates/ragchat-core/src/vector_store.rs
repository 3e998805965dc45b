//! Vector store trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Metadata, Result, SourceDocument};

/// An embedded chunk as written to a vector store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorDocument {
    pub id: String,
    pub content: String,
    pub embedding: Vec<f32>,
    pub metadata: Metadata,
}

/// A document returned by a similarity query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document: SourceDocument,
    pub score: f32,
}

/// Trait for vector stores (Pinecone, the local on-disk store, ...)
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace documents, returning how many were written
    async fn upsert(&self, documents: Vec<VectorDocument>) -> Result<usize>;

    /// Return up to `top_k` documents ordered by descending similarity
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredDocument>>;

    /// Remove every document the store holds for this session
    async fn clear(&self) -> Result<()>;

    /// Get the total number of documents
    async fn count(&self) -> Result<usize>;

    /// Human-readable description of where the vectors live
    fn describe(&self) -> String;
}

/// Cosine similarity of two vectors; 0.0 when lengths differ or a norm is zero
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
