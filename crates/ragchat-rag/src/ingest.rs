//! Ingestion pipeline: load, split, embed and store

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

use ragchat_core::{Embedder, Error, Ingestor, Metadata, Result, VectorDocument, VectorStore};

use crate::chunker::TextSplitter;
use crate::loader::{DocumentLoader, LoadedPage};

/// A chunk of page text waiting to be embedded
struct PendingChunk {
    id: String,
    text: String,
    metadata: Metadata,
}

/// Builds a vector store from a directory of documents
pub struct DocumentIngestor {
    loader: DocumentLoader,
    splitter: TextSplitter,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl DocumentIngestor {
    pub fn new(
        loader: DocumentLoader,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            loader,
            splitter: TextSplitter::default(),
            embedder,
            store,
        }
    }

    pub fn with_splitter(mut self, splitter: TextSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    /// Split loaded pages into chunks that carry their page metadata
    fn chunk_pages(&self, pages: &[LoadedPage]) -> Vec<PendingChunk> {
        let mut chunks = Vec::new();

        for page in pages {
            let source = page.metadata.get("source").map(value_key).unwrap_or_default();
            let page_number = page.metadata.get("page_number").map(value_key).unwrap_or_default();

            for (index, text) in self.splitter.split(&page.content).into_iter().enumerate() {
                let id = format!("{:x}", md5::compute(format!("{}:{}:{}", source, page_number, index)));
                let mut metadata = page.metadata.clone();
                metadata.insert("chunk_index".to_string(), json!(index));
                chunks.push(PendingChunk { id, text, metadata });
            }
        }

        chunks
    }
}

fn value_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Ingestor for DocumentIngestor {
    async fn ingest(&self) -> Result<String> {
        let report = self.loader.load()?;
        info!(
            root = %self.loader.root().display(),
            files = report.files_loaded,
            skipped = report.files_skipped,
            "Loaded documents"
        );

        let chunks = self.chunk_pages(&report.pages);
        if chunks.is_empty() {
            return Ok(format!(
                "No documents found in {} ({} skipped), nothing ingested",
                self.loader.root().display(),
                report.files_skipped
            ));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_documents(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(Error::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let documents: Vec<VectorDocument> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| VectorDocument {
                id: chunk.id,
                content: chunk.text,
                embedding,
                metadata: chunk.metadata,
            })
            .collect();

        self.store.clear().await?;
        let written = self.store.upsert(documents).await?;
        info!(chunks = written, store = %self.store.describe(), "Ingestion complete");

        Ok(format!(
            "Ingested {} chunks from {} documents ({} skipped) into {}",
            written,
            report.files_loaded,
            report.files_skipped,
            self.store.describe()
        ))
    }
}
