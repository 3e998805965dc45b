//! Console front end for ragchat
//!
//! Banner, startup prompts, the chat loop and the history file.

mod chat_loop;
mod history;
mod mode;
mod ui;

pub use chat_loop::{ChatLoop, QUESTION_PROMPT, is_exit};
pub use history::{DEFAULT_HISTORY_FILE, HistoryStore};
pub use mode::{
    BACKEND_PROMPT, INGEST_PROMPT, IngestChoice, ask_ingest, handle_ingest_choice, select_backend,
};
pub use ui::{display_banner, prompt, render_answer, render_citations, strip_line_terminator};

// Re-export core types
pub use ragchat_core::{Error, Result};
