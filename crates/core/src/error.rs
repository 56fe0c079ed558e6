//! Error types for MindVault extraction.
//!
//! This module defines [`ExtractError`], the failure side of every call into
//! the Extractor. A primary-path miss is not an error: it routes to the
//! fallback path. Only the cases below ever reach a caller.
//!
//! # Example
//!
//! ```rust
//! use mindvault_core::{ExtractError, extract};
//!
//! match extract("", "https://example.com/a") {
//!     Ok(extracted) => println!("{}", extracted.article().title),
//!     Err(e) if e.is_unreadable() => println!("could not read this page"),
//!     Err(e) => println!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

/// Main error type for extraction operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The input could not be parsed into a document.
    ///
    /// Returned for empty or whitespace-only input, input carrying NUL bytes
    /// (binary content mistaken for HTML), and parse trees without a body.
    #[error("Failed to parse HTML: {reason}")]
    ParseFailure { reason: String },

    /// Neither the primary nor the fallback path produced any text.
    #[error("No content could be extracted from the document")]
    NoExtractableContent,

    /// The source URL is not an absolute URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ExtractError {
    pub(crate) fn parse_failure(reason: impl Into<String>) -> Self {
        ExtractError::ParseFailure { reason: reason.into() }
    }

    /// Whether this failure means "could not read this page".
    ///
    /// Ingestion callers reject the request without storing a record for
    /// both parse failures and documents without extractable text.
    pub fn is_unreadable(&self) -> bool {
        matches!(self, ExtractError::ParseFailure { .. } | ExtractError::NoExtractableContent)
    }
}

/// Result type alias for ExtractError.
pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExtractError::InvalidUrl("relative URL without a base".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_parse_failure_display() {
        let err = ExtractError::parse_failure("document is empty");
        assert_eq!(err.to_string(), "Failed to parse HTML: document is empty");
    }

    #[test]
    fn test_unreadable_grouping() {
        assert!(ExtractError::parse_failure("x").is_unreadable());
        assert!(ExtractError::NoExtractableContent.is_unreadable());
        assert!(!ExtractError::InvalidUrl("x".into()).is_unreadable());
    }
}
