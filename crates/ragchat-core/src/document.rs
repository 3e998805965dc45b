//! Retrieved documents and their citation projection

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Open key-value metadata attached to a document
pub type Metadata = serde_json::Map<String, Value>;

/// A passage returned by the retrieval chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub page_content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl SourceDocument {
    pub fn new(page_content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            page_content: page_content.into(),
            metadata,
        }
    }

    /// Project the open metadata map onto the fixed citation schema
    pub fn citation(&self) -> Citation {
        Citation {
            page_content: self.page_content.clone(),
            metadata: CitationMetadata::project(&self.metadata),
        }
    }
}

/// Fixed-schema view of a document's metadata.
///
/// Every field is always present; keys missing from the source map take
/// `""` or `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationMetadata {
    pub author: String,
    #[serde(rename = "creationDate")]
    pub creation_date: String,
    pub creator: String,
    pub file_path: String,
    pub format: String,
    pub keywords: String,
    #[serde(rename = "modDate")]
    pub mod_date: String,
    pub page_number: i64,
    pub producer: String,
    pub source: String,
    pub subject: String,
    pub title: String,
    pub total_pages: i64,
    pub trapped: String,
}

impl CitationMetadata {
    /// Total projection from an open map
    pub fn project(metadata: &Metadata) -> Self {
        let text = |key: &str| string_field(metadata.get(key));
        let number = |key: &str| number_field(metadata.get(key));

        Self {
            author: text("author"),
            creation_date: text("creationDate"),
            creator: text("creator"),
            file_path: text("file_path"),
            format: text("format"),
            keywords: text("keywords"),
            mod_date: text("modDate"),
            page_number: number("page_number"),
            producer: text("producer"),
            source: text("source"),
            subject: text("subject"),
            title: text("title"),
            total_pages: number("total_pages"),
            trapped: text("trapped"),
        }
    }
}

/// A retrieved passage with its projected metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub page_content: String,
    pub metadata: CitationMetadata,
}

fn string_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn number_field(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
