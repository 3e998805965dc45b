//! Document loading from a directory of text, markdown and HTML files

use chrono::{DateTime, Utc};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;
use tracing::{debug, warn};
use walkdir::WalkDir;

use ragchat_core::{Error, Metadata, Result};

/// Page separator inside a single file
const PAGE_BREAK: char = '\x0C';

static HORIZONTAL_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\x{A0}]+").expect("valid regex"));
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n+").expect("valid regex"));

/// Supported source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Text,
    Markdown,
    Html,
}

impl DocumentFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" | "text" => Some(DocumentFormat::Text),
            "md" | "markdown" => Some(DocumentFormat::Markdown),
            "html" | "htm" => Some(DocumentFormat::Html),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Text => "text",
            DocumentFormat::Markdown => "markdown",
            DocumentFormat::Html => "html",
        }
    }
}

/// One page of a loaded document
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPage {
    pub content: String,
    pub metadata: Metadata,
}

/// Everything a directory scan produced
#[derive(Debug, Default)]
pub struct LoadReport {
    pub pages: Vec<LoadedPage>,
    pub files_loaded: usize,
    pub files_skipped: usize,
}

/// Loads every supported file below a root directory
pub struct DocumentLoader {
    root: PathBuf,
}

impl DocumentLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the root directory and load all supported files.
    ///
    /// Unreadable files and unsupported extensions are skipped and counted.
    pub fn load(&self) -> Result<LoadReport> {
        if !self.root.is_dir() {
            return Err(Error::DocumentLoader(format!(
                "Documents directory not found: {}",
                self.root.display()
            )));
        }

        let mut report = LoadReport::default();

        let mut paths: Vec<PathBuf> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect();
        paths.sort();

        for path in paths {
            match load_file(&path) {
                Ok(Some(pages)) => {
                    debug!(path = %path.display(), pages = pages.len(), "Loaded document");
                    report.files_loaded += 1;
                    report.pages.extend(pages);
                }
                Ok(None) => {
                    debug!(path = %path.display(), "Unsupported file type");
                    report.files_skipped += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), "Skipping document: {}", e);
                    report.files_skipped += 1;
                }
            }
        }

        Ok(report)
    }
}

/// Load a single file, returning `None` for unsupported extensions
pub fn load_file(path: &Path) -> Result<Option<Vec<LoadedPage>>> {
    let Some(format) = DocumentFormat::from_path(path) else {
        return Ok(None);
    };

    let raw = fs::read_to_string(path)?;
    let file_meta = fs::metadata(path)?;

    let title = match format {
        DocumentFormat::Markdown => markdown_title(&raw),
        DocumentFormat::Html => html_title(&raw)?,
        DocumentFormat::Text => None,
    }
    .unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let rendered: Vec<String> = raw
        .split(PAGE_BREAK)
        .map(|page| render_page(page, format))
        .collect::<Result<_>>()?;
    let total_pages = rendered.len();
    let path_str = path.to_string_lossy().into_owned();

    let mut pages = Vec::new();
    for (i, content) in rendered.into_iter().enumerate() {
        if content.is_empty() {
            continue;
        }

        let mut metadata = Metadata::new();
        metadata.insert("source".into(), json!(path_str));
        metadata.insert("file_path".into(), json!(path_str));
        metadata.insert("format".into(), json!(format.as_str()));
        metadata.insert("title".into(), json!(title));
        metadata.insert("page_number".into(), json!(i + 1));
        metadata.insert("total_pages".into(), json!(total_pages));
        if let Some(created) = file_meta.created().ok().map(rfc3339) {
            metadata.insert("creationDate".into(), json!(created));
        }
        if let Some(modified) = file_meta.modified().ok().map(rfc3339) {
            metadata.insert("modDate".into(), json!(modified));
        }

        pages.push(LoadedPage { content, metadata });
    }

    Ok(Some(pages))
}

fn render_page(page: &str, format: DocumentFormat) -> Result<String> {
    let text = match format {
        DocumentFormat::Text => page.to_string(),
        DocumentFormat::Markdown => markdown_to_text(page),
        DocumentFormat::Html => html_to_text(page)?,
    };
    Ok(normalize_whitespace(&text))
}

fn rfc3339(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339()
}

/// Collapse runs of spaces and excess blank lines
pub fn normalize_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = HORIZONTAL_SPACE.replace_all(&text, " ");
    let text = BLANK_LINES.replace_all(&text, "\n\n");
    text.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Render markdown to plain text, keeping block boundaries as line breaks
pub fn markdown_to_text(markdown: &str) -> String {
    let mut out = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::End(TagEnd::Paragraph)
            | Event::End(TagEnd::Heading(_))
            | Event::End(TagEnd::CodeBlock) => out.push_str("\n\n"),
            Event::End(TagEnd::Item) => out.push('\n'),
            Event::Rule => out.push_str("\n\n"),
            _ => {}
        }
    }

    out
}

fn markdown_title(markdown: &str) -> Option<String> {
    let mut in_heading = false;
    let mut title = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading { .. }) => in_heading = true,
            Event::End(TagEnd::Heading(_)) => {
                let trimmed = title.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
                in_heading = false;
            }
            Event::Text(text) | Event::Code(text) if in_heading => title.push_str(&text),
            _ => {}
        }
    }

    None
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::DocumentLoader(format!("Bad selector {css}: {e:?}")))
}

/// Extract visible body text from an HTML document
pub fn html_to_text(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let block = selector("h1, h2, h3, h4, h5, h6, p, li, pre, td, th, blockquote")?;

    let blocks: Vec<String> = document
        .select(&block)
        .map(|element| element.text().collect::<Vec<_>>().join(" "))
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    if !blocks.is_empty() {
        return Ok(blocks.join("\n\n"));
    }

    // No block-level markup, fall back to all body text
    let body = selector("body")?;
    Ok(document
        .select(&body)
        .flat_map(|element| element.text())
        .collect::<Vec<_>>()
        .join(" "))
}

fn html_title(html: &str) -> Result<Option<String>> {
    let document = Html::parse_document(html);
    let title = selector("title")?;
    Ok(document
        .select(&title)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty()))
}
