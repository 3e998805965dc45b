//! Retrieval-augmented generation pieces for ragchat
//!
//! Document loading, chunking, the local and Pinecone vector stores, the
//! ingestion pipeline and the conversational retrieval chain.

mod chunker;
mod engine;
mod ingest;
mod loader;
mod pinecone;
mod vector_store;


use std::path::Path;
use std::sync::Arc;

pub use chunker::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, TextSplitter};
pub use engine::{ConversationalRetrievalChain, condense_prompt, format_history, qa_system_prompt};
pub use ingest::DocumentIngestor;
pub use loader::{
    DocumentFormat, DocumentLoader, LoadReport, LoadedPage, html_to_text, load_file,
    markdown_to_text, normalize_whitespace,
};
pub use pinecone::{PineconeConfig, PineconeVectorStore, TEXT_KEY};
pub use vector_store::{INDEX_FILE, LocalVectorStore};

// Re-export core types for convenience
pub use ragchat_core::{
    Backend, Error, Ingestor, QueryProcessor, Result, SessionConfig, VectorStore,
};

/// Open the vector store selected by the session's backend
pub async fn open_store(config: &SessionConfig, local_dir: &Path) -> Result<Arc<dyn VectorStore>> {
    match config.backend {
        Backend::Pinecone => {
            let store = PineconeVectorStore::connect(PineconeConfig::from_session(config)).await?;
            Ok(Arc::new(store))
        }
        Backend::Local => Ok(Arc::new(LocalVectorStore::open(local_dir)?)),
    }
}
