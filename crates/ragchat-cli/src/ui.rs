//! Console output and line input for the chat session

use colored::*;
use std::io::{BufRead, Write};

use ragchat_core::{Citation, QueryResult, Result, SessionConfig};

/// Print the startup banner listing credentials and settings.
///
/// Secrets are shown verbatim so the user can confirm which keys were picked up.
pub fn display_banner<W: Write>(out: &mut W, config: &SessionConfig) -> Result<()> {
    writeln!(out, "Using the following credentials:")?;
    writeln!(out, "OpenAI API Key: {}", config.openai_api_key.red())?;
    writeln!(out, "Pinecone API Key: {}", config.pinecone_api_key.blue())?;
    writeln!(out, "Pinecone Environment: {}", config.pinecone_environment.blue())?;
    writeln!(out, "Pinecone Index: {}", config.pinecone_index.blue())?;
    writeln!(out, "Pinecone Namespace: {}", config.namespace.green())?;
    writeln!(out)?;
    writeln!(out, "Using the following settings:")?;
    writeln!(
        out,
        "Temperature (Creativity): {}",
        config.temperature.to_string().magenta()
    )?;
    writeln!(
        out,
        "Sources (Cites): {}",
        config.source_amount.to_string().magenta()
    )?;
    writeln!(out)?;
    Ok(())
}

/// Print `question` and read one line.
///
/// Only the line terminator is removed. Returns `None` at end of input.
pub fn prompt<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    question: &str,
) -> Result<Option<String>> {
    write!(writer, "{}", question)?;
    writer.flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    Ok(Some(strip_line_terminator(&line).to_string()))
}

pub fn strip_line_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Print the answer followed by its citation block
pub fn render_answer<W: Write>(out: &mut W, result: &QueryResult) -> Result<()> {
    writeln!(out, "{} {}", "AI:".blue().bold(), result.answer)?;

    let citations: Vec<Citation> = result.source_documents.iter().map(|d| d.citation()).collect();
    render_citations(out, &citations)
}

pub fn render_citations<W: Write>(out: &mut W, citations: &[Citation]) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "Answer Citations".red())?;

    for citation in citations {
        writeln!(out, "{} {}", "Source:".green().bold(), citation.metadata.source)?;
        writeln!(out, "{} {}", "Page Number:".magenta(), citation.metadata.page_number)?;
    }

    Ok(())
}
