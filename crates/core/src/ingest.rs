//! Ingestion boundary: run the extractor on downloaded markup and hand the
//! result to a storage collaborator.
//!
//! Extraction is CPU-bound, so [`Ingestor`] moves it onto tokio's blocking
//! pool and bounds it with an optional deadline. A record is written only
//! when extraction succeeds.
//!
//! # Example
//!
//! ```rust
//! use mindvault_core::ingest::{Ingestor, MemoryStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let ingestor = Ingestor::new(MemoryStore::new());
//! let html = "<html><head><title>Hi</title></head><body><p>Hello world</p></body></html>";
//!
//! let stored = ingestor.ingest("user-1", html.to_string(), "https://example.com/a").await.unwrap();
//! assert_eq!(stored.title, "Hi");
//!
//! let hits = ingestor.search("user-1", "hello").await.unwrap();
//! assert_eq!(hits.len(), 1);
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::article::Extracted;
use crate::error::ExtractError;
use crate::extractor::{Extractor, ExtractorConfig};

/// A bookmark ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBookmark {
    pub owner_id: String,
    pub source_url: String,
    pub title: String,
    pub text_content: String,
    pub content: Option<String>,
    pub excerpt: Option<String>,
}

impl NewBookmark {
    /// Builds the record for `owner_id` from an extraction result
    pub fn from_extracted(owner_id: &str, source_url: &str, extracted: Extracted) -> Self {
        let article = extracted.into_article();
        Self {
            owner_id: owner_id.to_string(),
            source_url: source_url.to_string(),
            title: article.title,
            text_content: article.text_content,
            content: Some(article.content),
            excerpt: Some(article.excerpt).filter(|excerpt| !excerpt.is_empty()),
        }
    }
}

/// A persisted bookmark, as returned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBookmark {
    pub id: Uuid,
    pub owner_id: String,
    pub source_url: String,
    pub title: String,
    pub text_content: String,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Failures reported by a [`BookmarkStore`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Record rejected by storage: {0}")]
    Rejected(String),

    #[error("Invalid search term: {0:?}")]
    InvalidQuery(String),
}

/// Storage collaborator.
///
/// Implementations own record identity, timestamps and search ranking.
/// `search` must only return records belonging to `owner_id`.
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    async fn insert(&self, bookmark: NewBookmark) -> Result<StoredBookmark, StoreError>;

    async fn search(&self, owner_id: &str, term: &str) -> Result<Vec<StoredBookmark>, StoreError>;
}

/// Errors from the ingestion workflow
#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("Extraction did not finish within {0:?}")]
    DeadlineExceeded(Duration),

    #[error("Extraction worker failed: {0}")]
    Worker(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IngestError {
    /// Whether the page itself could not be read (as opposed to an
    /// infrastructure failure)
    pub fn is_unreadable(&self) -> bool {
        matches!(self, IngestError::Extract(e) if e.is_unreadable())
    }
}

/// Configuration for the ingestion workflow
#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    /// Upper bound on a single extraction, `None` to wait indefinitely
    pub deadline: Option<Duration>,
    /// Extractor settings
    pub extractor: ExtractorConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { deadline: Some(Duration::from_secs(30)), extractor: ExtractorConfig::default() }
    }
}

/// Runs extraction off the async executor and persists successful results
pub struct Ingestor<S> {
    store: S,
    extractor: Extractor,
    deadline: Option<Duration>,
}

impl<S: BookmarkStore> Ingestor<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, IngestConfig::default())
    }

    pub fn with_config(store: S, config: IngestConfig) -> Self {
        Self { store, extractor: Extractor::with_config(config.extractor), deadline: config.deadline }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs the extractor on the blocking pool, bounded by the deadline.
    ///
    /// On timeout the worker is left to finish and its result is dropped.
    pub async fn extract(&self, html: String, source_url: String) -> Result<Extracted, IngestError> {
        let extractor = self.extractor.clone();
        let task = tokio::task::spawn_blocking(move || extractor.extract(&html, &source_url));

        let joined = match self.deadline {
            Some(deadline) => match tokio::time::timeout(deadline, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(?deadline, "extraction deadline exceeded");
                    return Err(IngestError::DeadlineExceeded(deadline));
                }
            },
            None => task.await,
        };

        let extracted = joined.map_err(|e| IngestError::Worker(e.to_string()))??;
        Ok(extracted)
    }

    /// Extracts `html` and stores the result for `owner_id`.
    ///
    /// Nothing is written when extraction fails or times out. No retries.
    pub async fn ingest(&self, owner_id: &str, html: String, source_url: &str) -> Result<StoredBookmark, IngestError> {
        let extracted = self.extract(html, source_url.to_string()).await?;
        let path = extracted.path();

        let stored = self.store.insert(NewBookmark::from_extracted(owner_id, source_url, extracted)).await?;
        debug!(id = %stored.id, %path, url = source_url, "bookmark stored");
        Ok(stored)
    }

    /// Delegates a keyword search to the store.
    pub async fn search(&self, owner_id: &str, term: &str) -> Result<Vec<StoredBookmark>, IngestError> {
        Ok(self.store.search(owner_id, term).await?)
    }
}

/// In-process [`BookmarkStore`].
///
/// Search is a case-insensitive substring match over title and text,
/// scoped to the owner, newest first.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<StoredBookmark>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records across all owners
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl BookmarkStore for MemoryStore {
    async fn insert(&self, bookmark: NewBookmark) -> Result<StoredBookmark, StoreError> {
        if bookmark.title.is_empty() || bookmark.text_content.is_empty() {
            return Err(StoreError::Rejected("title and text_content are required".to_string()));
        }

        let stored = StoredBookmark {
            id: Uuid::new_v4(),
            owner_id: bookmark.owner_id,
            source_url: bookmark.source_url,
            title: bookmark.title,
            text_content: bookmark.text_content,
            content: bookmark.content,
            excerpt: bookmark.excerpt,
            created_at: OffsetDateTime::now_utc(),
        };
        self.records.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn search(&self, owner_id: &str, term: &str) -> Result<Vec<StoredBookmark>, StoreError> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Err(StoreError::InvalidQuery(term.to_string()));
        }

        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .filter(|record| record.owner_id == owner_id)
            .filter(|record| {
                record.title.to_lowercase().contains(&needle) || record.text_content.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }
}
