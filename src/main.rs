use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ragchat_cli::{
    ChatLoop, DEFAULT_HISTORY_FILE, HistoryStore, ask_ingest, display_banner, handle_ingest_choice,
    select_backend,
};
use ragchat_core::SessionConfig;
use ragchat_openai::{OpenAiClient, OpenAiConfig};
use ragchat_rag::{ConversationalRetrievalChain, DocumentIngestor, DocumentLoader, open_store};

#[derive(Parser)]
#[command(name = "ragchat")]
#[command(about = "Chat with your documents using retrieval-augmented generation", long_about = None)]
struct Cli {
    /// Directory of documents to ingest
    #[arg(long, default_value = "docs")]
    docs: PathBuf,

    /// Directory of the local vector store
    #[arg(long, default_value = "vectorstore")]
    vectorstore: PathBuf,

    /// File the chat history is written to after every answer
    #[arg(long, default_value = DEFAULT_HISTORY_FILE)]
    history: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = SessionConfig::from_env();

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();

    display_banner(&mut output, &config)?;
    let config = select_backend(&mut input, &mut output, &config)?;
    let choice = ask_ingest(&mut input, &mut output)?;

    let openai = Arc::new(OpenAiClient::new(OpenAiConfig::from_session(&config))?);
    let store = open_store(&config, &cli.vectorstore)
        .await
        .with_context(|| format!("Failed to open the {} vector store", config.backend))?;
    info!(store = %store.describe(), "Vector store ready");

    let ingestor = DocumentIngestor::new(DocumentLoader::new(&cli.docs), openai.clone(), store.clone());
    handle_ingest_choice(&mut output, choice, config.backend, &cli.vectorstore, &ingestor).await?;
    output.flush()?;

    let chain = ConversationalRetrievalChain::new(openai.clone(), openai, store, &config);
    let mut chat = ChatLoop::new(&chain, HistoryStore::new(cli.history));
    chat.run(&mut input, &mut output).await?;

    Ok(())
}
