//! Chat turns and the in-memory conversation history

use serde::{Deserialize, Serialize};

/// One question/answer exchange.
///
/// Serializes as a two-element `[question, answer]` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}

impl ChatTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

impl From<(String, String)> for ChatTurn {
    fn from((question, answer): (String, String)) -> Self {
        Self { question, answer }
    }
}

impl From<ChatTurn> for (String, String) {
    fn from(turn: ChatTurn) -> Self {
        (turn.question, turn.answer)
    }
}

/// Append-only list of chat turns for one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatHistory {
    turns: Vec<ChatTurn>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl From<Vec<ChatTurn>> for ChatHistory {
    fn from(turns: Vec<ChatTurn>) -> Self {
        Self { turns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_serializes_as_pair() {
        let turn = ChatTurn::new("What is X?", "X is Y.");
        let json = serde_json::to_string(&turn).unwrap();
        assert_eq!(json, r#"["What is X?","X is Y."]"#);
    }

    #[test]
    fn test_history_serializes_as_array_of_pairs() {
        let mut history = ChatHistory::new();
        history.push(ChatTurn::new("a", "b"));
        history.push(ChatTurn::new("c", "d"));

        let json = serde_json::to_string(&history).unwrap();
        assert_eq!(json, r#"[["a","b"],["c","d"]]"#);
    }

    #[test]
    fn test_history_deserializes_from_pairs() {
        let history: ChatHistory = serde_json::from_str(r#"[["q1","a1"]]"#).unwrap();
        assert_eq!(history.turns(), &[ChatTurn::new("q1", "a1")]);
    }

    #[test]
    fn test_history_rejects_wrong_arity() {
        let parsed = serde_json::from_str::<ChatHistory>(r#"[["only one"]]"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_push_keeps_order() {
        let mut history = ChatHistory::new();
        assert!(history.is_empty());
        for i in 0..3 {
            history.push(ChatTurn::new(format!("q{i}"), format!("a{i}")));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.turns()[2].question, "q2");
    }
}
