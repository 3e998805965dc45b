//! Read-eval-print loop over the query processor

use std::io::{BufRead, Write};
use tracing::{debug, info};

use ragchat_core::{ChatHistory, ChatTurn, QueryInput, QueryProcessor, Result};

use crate::history::HistoryStore;
use crate::ui::{prompt, render_answer};

pub const QUESTION_PROMPT: &str = "Please enter your question (or type 'exit' to end): ";

/// True when the input ends the session
pub fn is_exit(input: &str) -> bool {
    input.to_lowercase() == "exit"
}

/// Interactive question/answer session.
///
/// Each answered question is appended to the history and the history file
/// is rewritten before the next prompt.
pub struct ChatLoop<'a, P: QueryProcessor + ?Sized> {
    processor: &'a P,
    store: HistoryStore,
    history: ChatHistory,
}

impl<'a, P: QueryProcessor + ?Sized> ChatLoop<'a, P> {
    pub fn new(processor: &'a P, store: HistoryStore) -> Self {
        Self {
            processor,
            store,
            history: ChatHistory::new(),
        }
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// Run until `exit` or end of input. Processor and file errors end the session.
    pub async fn run<R: BufRead, W: Write>(&mut self, reader: &mut R, writer: &mut W) -> Result<()> {
        loop {
            let Some(question) = prompt(reader, writer, QUESTION_PROMPT)? else {
                debug!("Input closed");
                break;
            };
            if is_exit(&question) {
                break;
            }

            self.turn(question, writer).await?;
        }

        info!(turns = self.history.len(), "Chat session ended");
        Ok(())
    }

    async fn turn<W: Write>(&mut self, question: String, writer: &mut W) -> Result<()> {
        let result = self
            .processor
            .process(QueryInput {
                question: &question,
                chat_history: self.history.turns(),
            })
            .await?;

        render_answer(writer, &result)?;
        writer.flush()?;

        self.history.push(ChatTurn::new(question, result.answer));
        self.store.save(&self.history).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragchat_core::{Error, Metadata, QueryResult, SourceDocument};
    use serde_json::json;
    use std::io::Cursor;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Answers every question with the same text and records the history it was given
    struct FixedProcessor {
        answer: String,
        documents: Vec<SourceDocument>,
        seen_history: Mutex<Vec<usize>>,
    }

    impl FixedProcessor {
        fn new(answer: &str, documents: Vec<SourceDocument>) -> Self {
            Self {
                answer: answer.to_string(),
                documents,
                seen_history: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl QueryProcessor for FixedProcessor {
        async fn process(&self, input: QueryInput<'_>) -> Result<QueryResult> {
            self.seen_history.lock().unwrap().push(input.chat_history.len());
            Ok(QueryResult {
                answer: self.answer.clone(),
                source_documents: self.documents.clone(),
            })
        }
    }

    struct FailingProcessor;

    #[async_trait]
    impl QueryProcessor for FailingProcessor {
        async fn process(&self, _input: QueryInput<'_>) -> Result<QueryResult> {
            Err(Error::LLMProvider("service unavailable".to_string()))
        }
    }

    fn document(source: &str, page: i64) -> SourceDocument {
        let mut metadata = Metadata::new();
        metadata.insert("source".into(), json!(source));
        metadata.insert("page_number".into(), json!(page));
        SourceDocument::new("passage", metadata)
    }

    #[test]
    fn test_exit_is_case_insensitive() {
        assert!(is_exit("exit"));
        assert!(is_exit("EXIT"));
        assert!(is_exit("Exit"));
        assert!(!is_exit(" exit"));
        assert!(!is_exit("quit"));
    }

    #[tokio::test]
    async fn test_single_turn_renders_and_persists() {
        colored::control::set_override(false);
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat_history.json");
        let processor = FixedProcessor::new("X is Y.", vec![document("doc.pdf", 3)]);

        let mut chat = ChatLoop::new(&processor, HistoryStore::new(&path));
        let mut input = Cursor::new("What is X?\nexit\n");
        let mut output = Vec::new();
        chat.run(&mut input, &mut output).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        insta::assert_snapshot!(output, @r"
Please enter your question (or type 'exit' to end): AI: X is Y.

Answer Citations
Source: doc.pdf
Page Number: 3
Please enter your question (or type 'exit' to end):
");

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved, json!([["What is X?", "X is Y."]]));
        assert_eq!(chat.history().len(), 1);
    }

    #[tokio::test]
    async fn test_exit_first_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat_history.json");
        let processor = FixedProcessor::new("unused", Vec::new());

        let mut chat = ChatLoop::new(&processor, HistoryStore::new(&path));
        chat.run(&mut Cursor::new("EXIT\n"), &mut Vec::new()).await.unwrap();

        assert!(chat.history().is_empty());
        assert!(!path.exists());
        assert!(processor.seen_history.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_grows_each_turn() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat_history.json");
        let processor = FixedProcessor::new("ok", vec![document("a.txt", 1), document("b.txt", 2)]);

        let mut chat = ChatLoop::new(&processor, HistoryStore::new(&path));
        chat.run(&mut Cursor::new("one\ntwo\nthree"), &mut Vec::new())
            .await
            .unwrap();

        assert_eq!(*processor.seen_history.lock().unwrap(), vec![0, 1, 2]);
        let saved: ChatHistory =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let questions: Vec<&str> = saved.turns().iter().map(|t| t.question.as_str()).collect();
        assert_eq!(questions, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_citations_keep_processor_order() {
        colored::control::set_override(false);
        let dir = tempdir().unwrap();
        let mut metadata = Metadata::new();
        metadata.insert("page_number".into(), json!("12"));
        let documents = vec![
            document("b.pdf", 9),
            SourceDocument::new("no source", metadata),
            document("b.pdf", 9),
        ];
        let processor = FixedProcessor::new("answer", documents);

        let mut chat = ChatLoop::new(&processor, HistoryStore::new(dir.path().join("h.json")));
        let mut output = Vec::new();
        chat.run(&mut Cursor::new("q\n"), &mut output).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        let sources: Vec<&str> = output.lines().filter(|l| l.starts_with("Source:")).collect();
        let pages: Vec<&str> = output.lines().filter(|l| l.starts_with("Page Number:")).collect();
        assert_eq!(sources, vec!["Source: b.pdf", "Source: ", "Source: b.pdf"]);
        assert_eq!(pages, vec!["Page Number: 9", "Page Number: 12", "Page Number: 9"]);
    }

    #[tokio::test]
    async fn test_processor_error_ends_session_without_saving() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat_history.json");

        let mut chat = ChatLoop::new(&FailingProcessor, HistoryStore::new(&path));
        let err = chat
            .run(&mut Cursor::new("hello\n"), &mut Vec::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::LLMProvider(_)));
        assert!(!path.exists());
    }
}
