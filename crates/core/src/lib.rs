pub mod article;
pub mod dom_tree;
pub mod error;
pub mod extract;
pub mod extractor;
pub mod fallback;
#[cfg(feature = "ingest")]
pub mod ingest;
pub mod metadata;
pub mod parse;
pub mod postprocess;
pub mod preprocess;
pub mod scoring;

pub use article::{Article, Extracted, ExtractionPath, OutputFormat};
#[doc(hidden)]
pub use dom_tree::{DomNode, DomTree, NodeId};
pub use error::{ExtractError, Result};
#[doc(hidden)]
pub use extract::{ExtractConfig, ExtractedContent, extract_content};
pub use extractor::{Extractor, ExtractorConfig, ExtractorConfigBuilder, extract};
pub use fallback::extract_fallback;
#[cfg(feature = "ingest")]
pub use ingest::{BookmarkStore, IngestConfig, IngestError, Ingestor, MemoryStore, NewBookmark, StoreError, StoredBookmark};
pub use metadata::Metadata;
pub use parse::Document;
#[doc(hidden)]
pub use postprocess::{PostProcessConfig, postprocess_html};
#[doc(hidden)]
pub use preprocess::{PreprocessConfig, preprocess_html};
#[doc(hidden)]
pub use scoring::{ScoreConfig, base_tag_score, class_id_weight, content_score, link_density};
