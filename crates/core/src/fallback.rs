//! Naive whole-body extraction, used when the primary path comes up empty.

use tracing::debug;

use crate::article::{Article, MAX_EXCERPT_LEN, UNTITLED, char_prefix, collapse_whitespace};
use crate::metadata::Metadata;
use crate::parse::Document;
use crate::{ExtractError, Result};

/// Build an article from the whole `<body>` of an unscrubbed document.
///
/// The title is the `<title>` text or [`UNTITLED`]. The text is every text
/// node under `<body>`, script contents included, with whitespace collapsed.
/// The content is the body's inner markup as parsed. The excerpt is a plain
/// character prefix of the text.
///
/// # Errors
///
/// Returns [`ExtractError::NoExtractableContent`] when the body holds no
/// text at all.
pub fn extract_fallback(doc: &Document) -> Result<Article> {
    let body = doc.body().ok_or(ExtractError::NoExtractableContent)?;

    let text_content = collapse_whitespace(&body.text());
    if text_content.is_empty() {
        debug!("fallback found no text in body");
        return Err(ExtractError::NoExtractableContent);
    }

    let title = doc.title().filter(|title| !title.is_empty()).unwrap_or_else(|| UNTITLED.to_string());
    let excerpt = char_prefix(&text_content, MAX_EXCERPT_LEN);

    Ok(Article::new(title, body.inner_html(), text_content, excerpt, Metadata::default()))
}
