//! Chat history file

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use ragchat_core::{ChatHistory, Result};

pub const DEFAULT_HISTORY_FILE: &str = "chat_history.json";

/// Writes the whole conversation to a JSON file, replacing it each time
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_FILE)
    }
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize as an array of `[question, answer]` pairs with 4-space indent.
    ///
    /// Non-ASCII text is written as-is, not escaped.
    pub fn to_json(history: &ChatHistory) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = Serializer::with_formatter(&mut buf, formatter);
        history.serialize(&mut serializer)?;

        // serde_json only ever emits UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Overwrite the history file with the full conversation
    pub async fn save(&self, history: &ChatHistory) -> Result<()> {
        let json = Self::to_json(history)?;
        fs::write(&self.path, json).await?;
        debug!(path = %self.path.display(), turns = history.len(), "Saved chat history");
        Ok(())
    }
}
