//! Conversational retrieval chain

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use ragchat_core::{
    ChatMessage, ChatTurn, Embedder, LLMProvider, QueryInput, QueryProcessor, QueryResult,
    Result, SessionConfig, SourceDocument, VectorStore,
};

const CONDENSE_TEMPLATE: &str = "Given the following conversation and a follow up question, \
rephrase the follow up question to be a standalone question.\n\n\
Chat History:\n{chat_history}\n\
Follow Up Input: {question}\n\
Standalone question:";

const QA_SYSTEM_TEMPLATE: &str = "Use the following pieces of context to answer the users question. \n\
If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\
----------------\n\
{context}";

/// Answers follow-up questions against a vector store.
///
/// With prior turns, the question is first rewritten into a standalone one
/// so retrieval does not depend on pronouns or omitted context. The answer
/// itself is generated for the question as the user typed it.
pub struct ConversationalRetrievalChain {
    llm: Arc<dyn LLMProvider>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    temperature: f32,
    source_amount: usize,
}

impl ConversationalRetrievalChain {
    pub fn new(
        llm: Arc<dyn LLMProvider>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            llm,
            embedder,
            store,
            temperature: config.temperature,
            source_amount: config.source_amount,
        }
    }

    async fn standalone_question(&self, question: &str, history: &[ChatTurn]) -> Result<String> {
        if history.is_empty() {
            return Ok(question.to_string());
        }

        let prompt = condense_prompt(question, history);
        let result = self.llm.generate(&[ChatMessage::user(prompt)], 0.0).await?;
        let condensed = result.text.trim().to_string();
        debug!(%condensed, "Condensed follow-up question");
        Ok(condensed)
    }
}

/// Render prior turns as `Human:` / `Assistant:` lines
pub fn format_history(history: &[ChatTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("Human: {}\nAssistant: {}", turn.question, turn.answer))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn condense_prompt(question: &str, history: &[ChatTurn]) -> String {
    CONDENSE_TEMPLATE
        .replace("{chat_history}", &format_history(history))
        .replace("{question}", question)
}

pub fn qa_system_prompt(documents: &[SourceDocument]) -> String {
    let context = documents
        .iter()
        .map(|d| d.page_content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    QA_SYSTEM_TEMPLATE.replace("{context}", &context)
}

#[async_trait]
impl QueryProcessor for ConversationalRetrievalChain {
    async fn process(&self, input: QueryInput<'_>) -> Result<QueryResult> {
        let question = self
            .standalone_question(input.question, input.chat_history)
            .await?;

        let vector = self.embedder.embed_query(&question).await?;
        let source_documents: Vec<SourceDocument> = self
            .store
            .query(&vector, self.source_amount)
            .await?
            .into_iter()
            .map(|scored| scored.document)
            .collect();
        debug!(count = source_documents.len(), "Retrieved context documents");

        let messages = [
            ChatMessage::system(qa_system_prompt(&source_documents)),
            ChatMessage::user(input.question),
        ];
        let result = self.llm.generate(&messages, self.temperature).await?;

        Ok(QueryResult {
            answer: result.text.trim().to_string(),
            source_documents,
        })
    }
}
