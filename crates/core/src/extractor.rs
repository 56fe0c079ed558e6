//! Main content extraction API.
//!
//! The entry point is [`Extractor`] (or the [`extract`] shorthand). It runs
//! the structured path first and falls back to naive whole-body extraction
//! when that yields no text.
//!
//! # Example
//!
//! ```rust
//! use mindvault_core::{ExtractorConfig, Extractor};
//!
//! let html = "<html><head><title>Hi</title></head><body><p>Hello   world</p></body></html>";
//! let extractor = Extractor::with_config(ExtractorConfig::builder().preserve_images(false).build());
//! let extracted = extractor.extract(html, "https://example.com/a").unwrap();
//!
//! assert_eq!(extracted.article().title, "Hi");
//! assert_eq!(extracted.article().text_content, "Hello world");
//! ```

use tracing::debug;
use url::Url;

use crate::article::{Article, Extracted, MAX_EXCERPT_LEN, truncate_on_word};
use crate::extract::{ExtractConfig, extract_content};
use crate::fallback::extract_fallback;
use crate::parse::Document;
use crate::postprocess::PostProcessConfig;
use crate::preprocess::PreprocessConfig;
use crate::{ExtractError, Result};

/// Configuration for the [`Extractor`].
///
/// # Example
///
/// ```rust
/// use mindvault_core::ExtractorConfig;
///
/// let config = ExtractorConfig::builder()
///     .min_score(25.0)
///     .keep_classes(true)
///     .build();
/// assert!(config.keep_classes);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// Top candidate score below which the whole body is used (default: 20.0).
    pub min_score: f64,

    /// Number of top candidates to track (default: 5).
    pub nb_top_candidates: usize,

    /// Sibling score multiplier (default: 0.2).
    pub sibling_threshold: f64,

    /// Link density above which containers are cleaned away (default: 0.5).
    pub max_link_density: f64,

    /// Maximum elements to parse (0 = unlimited, default: 0).
    ///
    /// Documents over the cap skip straight to the fallback path.
    pub max_elems_to_parse: usize,

    /// Whether to remove unlikely candidates (default: true).
    pub remove_unlikely: bool,

    /// Whether to preserve class attributes in output HTML (default: false).
    pub keep_classes: bool,

    /// Whether to preserve images in output HTML (default: true).
    pub preserve_images: bool,

    /// Excerpt length bound in characters, at most 200 (default: 200).
    pub excerpt_len: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_score: 20.0,
            nb_top_candidates: 5,
            sibling_threshold: 0.2,
            max_link_density: 0.5,
            max_elems_to_parse: 0,
            remove_unlikely: true,
            keep_classes: false,
            preserve_images: true,
            excerpt_len: MAX_EXCERPT_LEN,
        }
    }
}

impl ExtractorConfig {
    /// Creates a new builder for ExtractorConfig.
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder::new()
    }

    fn extract_config(&self) -> ExtractConfig {
        ExtractConfig {
            min_score: self.min_score,
            nb_top_candidates: self.nb_top_candidates,
            sibling_threshold: self.sibling_threshold,
            max_link_density: self.max_link_density,
            max_elems_to_parse: self.max_elems_to_parse,
            postprocess: PostProcessConfig {
                strip_images: !self.preserve_images,
                keep_classes: self.keep_classes,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn preprocess_config(&self) -> PreprocessConfig {
        PreprocessConfig { remove_unlikely: self.remove_unlikely, ..Default::default() }
    }
}

/// Builder for ExtractorConfig.
///
/// ```rust
/// use mindvault_core::ExtractorConfig;
///
/// let config = ExtractorConfig::builder().excerpt_len(500).build();
/// assert_eq!(config.excerpt_len, 200);
/// ```
#[derive(Debug, Default)]
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
}

impl ExtractorConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ExtractorConfig::default() }
    }

    /// Sets the minimum score threshold.
    pub fn min_score(mut self, value: f64) -> Self {
        self.config.min_score = value;
        self
    }

    /// Sets the number of top candidates.
    pub fn nb_top_candidates(mut self, value: usize) -> Self {
        self.config.nb_top_candidates = value;
        self
    }

    /// Sets the sibling score multiplier.
    pub fn sibling_threshold(mut self, value: f64) -> Self {
        self.config.sibling_threshold = value;
        self
    }

    /// Sets the link density cleaning threshold.
    pub fn max_link_density(mut self, value: f64) -> Self {
        self.config.max_link_density = value;
        self
    }

    /// Sets the maximum elements to parse.
    pub fn max_elems_to_parse(mut self, value: usize) -> Self {
        self.config.max_elems_to_parse = value;
        self
    }

    /// Sets whether to remove unlikely candidates.
    pub fn remove_unlikely(mut self, value: bool) -> Self {
        self.config.remove_unlikely = value;
        self
    }

    /// Sets whether to preserve class attributes in output HTML.
    pub fn keep_classes(mut self, value: bool) -> Self {
        self.config.keep_classes = value;
        self
    }

    /// Sets whether to preserve images in output HTML.
    pub fn preserve_images(mut self, value: bool) -> Self {
        self.config.preserve_images = value;
        self
    }

    /// Sets the excerpt bound, clamped to 200 characters.
    pub fn excerpt_len(mut self, value: usize) -> Self {
        self.config.excerpt_len = value.min(MAX_EXCERPT_LEN);
        self
    }

    /// Builds the config.
    pub fn build(self) -> ExtractorConfig {
        self.config
    }
}

/// Stateless article extractor.
///
/// Holds only its configuration, so one instance can be cloned or shared
/// across threads and called concurrently.
///
/// # Example
///
/// ```rust
/// use mindvault_core::{ExtractError, Extractor};
///
/// let extractor = Extractor::new();
/// let result = extractor.extract("<html><body></body></html>", "https://example.com/");
/// assert_eq!(result, Err(ExtractError::NoExtractableContent));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    /// Creates a new Extractor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new Extractor with a custom configuration.
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extracts the article from `html`, fetched from `source_url`.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::ParseFailure`] if `html` cannot be parsed at all
    /// - [`ExtractError::InvalidUrl`] if `source_url` is not absolute
    /// - [`ExtractError::NoExtractableContent`] if neither path finds text
    pub fn extract(&self, html: &str, source_url: &str) -> Result<Extracted> {
        let doc = Document::parse(html)?;
        let base_url =
            Url::parse(source_url).map_err(|e| ExtractError::InvalidUrl(format!("{source_url}: {e}")))?;
        let doc = doc.with_base_url(base_url);

        match self.extract_structured(html, &doc) {
            Ok(article) => {
                debug!(path = "structured", length = article.length, url = source_url, "extracted article");
                return Ok(Extracted::Structured(article));
            }
            Err(ExtractError::NoExtractableContent) => {}
            Err(e) => return Err(e),
        }

        let article = extract_fallback(&doc)?;
        debug!(path = "fallback", length = article.length, url = source_url, "extracted article");
        Ok(Extracted::Fallback(article))
    }

    /// Structured path. Any miss is reported as `NoExtractableContent`.
    fn extract_structured(&self, html: &str, doc: &Document) -> Result<Article> {
        let base_url = doc.base_url().cloned().ok_or(ExtractError::NoExtractableContent)?;

        let Ok(cleaned) =
            Document::parse_with_preprocessing(html, Some(base_url), &self.config.preprocess_config())
        else {
            debug!("nothing left after preprocessing");
            return Err(ExtractError::NoExtractableContent);
        };

        let extracted = extract_content(&cleaned, &self.config.extract_config())?;
        debug!(top_score = ?extracted.top_score, elements = extracted.element_count, "structured content found");

        let excerpt_source = doc
            .extract_description()
            .or(extracted.first_paragraph)
            .unwrap_or_else(|| extracted.text_content.clone());
        let excerpt = truncate_on_word(&excerpt_source, self.config.excerpt_len.min(MAX_EXCERPT_LEN));

        Ok(Article::new(
            doc.resolve_title(),
            extracted.content,
            extracted.text_content,
            excerpt,
            doc.extract_metadata(),
        ))
    }
}

/// Extracts an article with the default configuration.
///
/// # Example
///
/// ```rust
/// use mindvault_core::extract;
///
/// let html = "<html><head><title>Hi</title></head><body><script>var x=1;</script><p>Hello   world</p></body></html>";
/// let article = extract(html, "https://example.com/a").unwrap().into_article();
///
/// assert_eq!(article.title, "Hi");
/// assert_eq!(article.text_content, "Hello world");
/// assert_eq!(article.excerpt, "Hello world");
/// ```
pub fn extract(html: &str, source_url: &str) -> Result<Extracted> {
    Extractor::new().extract(html, source_url)
}
