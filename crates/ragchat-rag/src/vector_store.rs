//! Local on-disk vector store

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

use ragchat_core::{
    Error, Result, ScoredDocument, SourceDocument, VectorDocument, VectorStore, cosine_similarity,
};

/// File holding the serialized index inside the store directory
pub const INDEX_FILE: &str = "index.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct VectorStoreData {
    documents: Vec<VectorDocument>,
    embedding_dimension: usize,
}

/// Vector store kept in memory and mirrored to `<dir>/index.json`
pub struct LocalVectorStore {
    dir: PathBuf,
    documents: RwLock<Vec<VectorDocument>>,
}

impl LocalVectorStore {
    /// Open the store in `dir`, loading an existing index if there is one
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let index_path = dir.join(INDEX_FILE);

        let documents = if index_path.exists() {
            let content = fs::read_to_string(&index_path)?;
            let data: VectorStoreData = serde_json::from_str(&content)?;
            debug!(path = %index_path.display(), count = data.documents.len(), "Loaded local index");
            data.documents
        } else {
            Vec::new()
        };

        Ok(Self {
            dir,
            documents: RwLock::new(documents),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn lock_error<E: std::fmt::Display>(e: E) -> Error {
        Error::VectorStore(format!("Lock error: {}", e))
    }

    /// Save documents to the index file
    fn persist(&self, documents: &[VectorDocument]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let data = VectorStoreData {
            embedding_dimension: documents.first().map(|d| d.embedding.len()).unwrap_or(0),
            documents: documents.to_vec(),
        };

        let content = serde_json::to_string_pretty(&data)?;
        fs::write(self.dir.join(INDEX_FILE), content)?;
        Ok(())
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn upsert(&self, documents: Vec<VectorDocument>) -> Result<usize> {
        let mut docs = self.documents.write().map_err(Self::lock_error)?;
        let written = documents.len();

        for document in documents {
            match docs.iter_mut().find(|d| d.id == document.id) {
                Some(existing) => *existing = document,
                None => docs.push(document),
            }
        }

        self.persist(&docs)?;
        Ok(written)
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredDocument>> {
        let docs = self.documents.read().map_err(Self::lock_error)?;

        let mut results: Vec<ScoredDocument> = docs
            .iter()
            .map(|doc| ScoredDocument {
                document: SourceDocument::new(doc.content.clone(), doc.metadata.clone()),
                score: cosine_similarity(vector, &doc.embedding),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        Ok(results)
    }

    async fn clear(&self) -> Result<()> {
        let mut docs = self.documents.write().map_err(Self::lock_error)?;
        docs.clear();
        self.persist(&docs)
    }

    async fn count(&self) -> Result<usize> {
        let docs = self.documents.read().map_err(Self::lock_error)?;
        Ok(docs.len())
    }

    fn describe(&self) -> String {
        format!("local store at {}", self.dir.display())
    }
}
