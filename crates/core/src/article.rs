//! Article output type and text normalization.
//!
//! This module defines the [`Article`] struct, the canonical representation
//! an extraction produces, and [`Extracted`], which records which path
//! produced it.

use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;
use crate::{ExtractError, Result};

/// Upper bound on excerpt length in characters
pub const MAX_EXCERPT_LEN: usize = 200;

/// Placeholder title used when a document has none
pub const UNTITLED: &str = "Untitled";

/// Output format options for Article content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// HTML format (extracted content markup).
    Html,
    /// Plain text format (`text_content`).
    PlainText,
    /// JSON format (structured data).
    Json,
}

/// The complete result of reading an HTML document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Best-effort human-readable title, never empty.
    pub title: String,

    /// Main-content markup retained for re-display.
    pub content: String,

    /// Flattened plain text of the main content, whitespace collapsed.
    pub text_content: String,

    /// Short preview, at most 200 characters.
    pub excerpt: String,

    /// Length of `text_content` in characters.
    pub length: usize,

    /// Byline, site name, publication time and language, when known.
    pub metadata: Metadata,
}

impl Article {
    /// Creates a new Article, deriving `length` from `text_content`.
    pub fn new(title: String, content: String, text_content: String, excerpt: String, metadata: Metadata) -> Self {
        let length = text_content.chars().count();
        Self { title, content, text_content, excerpt, length, metadata }
    }

    /// Converts content to the specified format.
    pub fn to_format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Html => Ok(self.content.clone()),
            OutputFormat::PlainText => Ok(self.text_content.clone()),
            OutputFormat::Json => self.to_json().map(|v| v.to_string()),
        }
    }

    /// Gets the article as structured JSON.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| ExtractError::parse_failure(e.to_string()))
    }
}

/// Which path produced an [`Extracted`] article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionPath {
    /// Readability-style boundary detection
    Structured,
    /// Naive whole-body extraction
    Fallback,
}

impl std::fmt::Display for ExtractionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionPath::Structured => f.write_str("structured"),
            ExtractionPath::Fallback => f.write_str("fallback"),
        }
    }
}

/// Outcome of a successful extraction, tagged by the path that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "path", content = "article", rename_all = "lowercase")]
pub enum Extracted {
    /// The primary path found a content subtree with text.
    Structured(Article),
    /// The primary path came up empty and the whole body was used.
    Fallback(Article),
}

impl Extracted {
    /// Borrows the article regardless of path.
    pub fn article(&self) -> &Article {
        match self {
            Extracted::Structured(article) | Extracted::Fallback(article) => article,
        }
    }

    /// Takes the article regardless of path.
    pub fn into_article(self) -> Article {
        match self {
            Extracted::Structured(article) | Extracted::Fallback(article) => article,
        }
    }

    pub fn path(&self) -> ExtractionPath {
        match self {
            Extracted::Structured(_) => ExtractionPath::Structured,
            Extracted::Fallback(_) => ExtractionPath::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Extracted::Fallback(_))
    }
}

/// Collapses every whitespace run to a single space and trims both ends.
///
/// ```rust
/// use mindvault_core::article::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("  Hello \n\t world  "), "Hello world");
/// ```
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `max_chars` characters of `text`.
pub fn char_prefix(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Shortens `text` to at most `max_chars` characters on a word boundary.
///
/// Whitespace is collapsed first. Text that already fits is returned as-is;
/// otherwise it is cut after the last whole word that fits, or hard-cut at
/// `max_chars` when the first word alone is too long.
pub fn truncate_on_word(text: &str, max_chars: usize) -> String {
    let text = collapse_whitespace(text);
    if text.chars().count() <= max_chars {
        return text;
    }

    let prefix = char_prefix(&text, max_chars);
    let next_is_break = text.chars().nth(max_chars).is_some_and(char::is_whitespace);
    if next_is_break {
        return prefix;
    }

    match prefix.rfind(' ') {
        Some(cut) if cut > 0 => prefix[..cut].trim_end().to_string(),
        _ => prefix,
    }
}
