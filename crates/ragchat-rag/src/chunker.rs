//! Character-window text splitter

use ragchat_core::{Error, Result};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Splits text into overlapping windows of at most `chunk_size` characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidInput("chunk size must be positive".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::InvalidInput(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split text into trimmed, non-empty chunks.
    ///
    /// A window that would cut through a word is pulled back to the last
    /// whitespace in its final fifth, when there is one.
    pub fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let mut end = (start + self.chunk_size).min(chars.len());

            if end < chars.len() {
                let floor = end - self.chunk_size / 5;
                if let Some(pos) = (floor..end).rev().find(|&i| chars[i].is_whitespace()) {
                    end = pos + 1;
                }
            }

            let chunk: String = chars[start..end].iter().collect();
            let chunk = chunk.trim();
            if !chunk.is_empty() {
                chunks.push(chunk.to_string());
            }

            if end >= chars.len() {
                break;
            }

            start = end.saturating_sub(self.chunk_overlap).max(start + 1);
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(TextSplitter::new(0, 0).is_err());
        assert!(TextSplitter::new(100, 100).is_err());
        assert!(TextSplitter::new(100, 150).is_err());
        assert!(TextSplitter::new(100, 99).is_ok());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let splitter = TextSplitter::default();
        assert_eq!(splitter.split("  hello world  "), vec!["hello world"]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(TextSplitter::default().split("   \n ").is_empty());
    }

    #[test]
    fn test_windows_overlap_without_whitespace() {
        let splitter = TextSplitter::default();
        let text = "a".repeat(2500);
        let chunks = splitter.split(&text);

        let lengths: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();
        assert_eq!(lengths, vec![1000, 1000, 900]);
    }

    #[test]
    fn test_window_prefers_whitespace_boundary() {
        let splitter = TextSplitter::new(10, 2).unwrap();
        let chunks = splitter.split("abcdefgh ijklmnop");

        assert_eq!(chunks[0], "abcdefgh");
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert!(chunks.last().unwrap().ends_with("mnop"));
    }

    #[test]
    fn test_multibyte_characters_are_counted_as_chars() {
        let splitter = TextSplitter::new(4, 1).unwrap();
        let chunks = splitter.split("ééééééé");
        assert_eq!(chunks, vec!["éééé", "éééé"]);
    }
}
