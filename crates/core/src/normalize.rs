//! Text normalization for document paragraphs.
//!
//! Word documents carry text split across runs, with mixed line endings,
//! tabs, and decomposed Unicode. Paragraph text is cleaned up once here so
//! prompts and figure matching both see the same string.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex to collapse multiple whitespace characters into one.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{a0}]+").unwrap());

/// Text normalizer for paragraph text.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    /// Whether to keep explicit line breaks inside a paragraph.
    preserve_line_breaks: bool,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    /// Create a new text normalizer with default settings.
    pub fn new() -> Self {
        Self {
            preserve_line_breaks: true,
        }
    }

    /// Set whether to preserve line breaks.
    pub fn with_preserve_line_breaks(mut self, preserve: bool) -> Self {
        self.preserve_line_breaks = preserve;
        self
    }

    /// Normalize a paragraph.
    ///
    /// - Composes Unicode to NFC
    /// - Converts `\r\n` and `\r` to `\n`
    /// - Collapses runs of spaces and tabs to a single space
    /// - Trims each line and drops blank lines
    pub fn normalize(&self, text: &str) -> String {
        let composed: String = text.nfc().collect();
        let unified = composed.replace("\r\n", "\n").replace('\r', "\n");

        let lines = unified
            .lines()
            .map(|line| WHITESPACE_COLLAPSE_REGEX.replace_all(line, " ").trim().to_string())
            .filter(|line| !line.is_empty());

        if self.preserve_line_breaks {
            lines.collect::<Vec<_>>().join("\n")
        } else {
            lines.collect::<Vec<_>>().join(" ")
        }
    }
}

/// Shorten `text` to at most `max_words` words, appending an ellipsis when cut.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        words.join(" ")
    } else {
        format!("{}…", words[..max_words].join(" "))
    }
}
