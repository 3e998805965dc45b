//! Startup prompts choosing the backend and whether to ingest

use std::io::{BufRead, Write};
use std::path::Path;
use tracing::info;

use ragchat_core::{Backend, Ingestor, Result, SessionConfig};

use crate::ui::prompt;

pub const BACKEND_PROMPT: &str = "Do you want to use Pinecone? (Y/N): ";
pub const INGEST_PROMPT: &str = "Do you want to ingest? (Y/N): ";

/// Answer to the ingestion prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestChoice {
    Ingest,
    Reuse,
    Unspecified,
}

impl IngestChoice {
    /// Only an exact `Y` or `N` counts; everything else is unspecified
    pub fn parse(answer: &str) -> Self {
        match answer {
            "Y" => IngestChoice::Ingest,
            "N" => IngestChoice::Reuse,
            _ => IngestChoice::Unspecified,
        }
    }
}

/// Ask which backend to use and return the config with that backend fixed
pub fn select_backend<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    config: &SessionConfig,
) -> Result<SessionConfig> {
    let answer = prompt(reader, writer, BACKEND_PROMPT)?.unwrap_or_default();
    let backend = Backend::from_answer(&answer, &config.pinecone_api_key);

    if !backend.is_remote() {
        writeln!(
            writer,
            "Not using Pinecone or empty Pinecone API key provided. Using Chroma instead"
        )?;
    }
    info!(%backend, "Selected vector store backend");

    Ok(config.with_backend(backend))
}

/// Ask whether to ingest
pub fn ask_ingest<R: BufRead, W: Write>(reader: &mut R, writer: &mut W) -> Result<IngestChoice> {
    let answer = prompt(reader, writer, INGEST_PROMPT)?.unwrap_or_default();
    Ok(IngestChoice::parse(&answer))
}

/// Act on the ingestion answer, running the ingestor at most once
pub async fn handle_ingest_choice<W: Write>(
    writer: &mut W,
    choice: IngestChoice,
    backend: Backend,
    local_dir: &Path,
    ingestor: &dyn Ingestor,
) -> Result<()> {
    match choice {
        IngestChoice::Ingest => {
            let status = ingestor.ingest().await?;
            writeln!(writer, "{}", status)?;
        }
        IngestChoice::Reuse => match backend {
            Backend::Pinecone => writeln!(writer, "Using already ingested namespace at Pinecone.")?,
            Backend::Local => writeln!(
                writer,
                "Using already ingested vectors at {}.",
                display_dir(local_dir)
            )?,
        },
        IngestChoice::Unspecified => writeln!(writer, "No method given, passing")?,
    }

    Ok(())
}

/// Show relative directories with a leading `./`
fn display_dir(dir: &Path) -> String {
    if dir.is_relative() && !dir.starts_with(".") {
        format!("./{}", dir.display())
    } else {
        dir.display().to_string()
    }
}
