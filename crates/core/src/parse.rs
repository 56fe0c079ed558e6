//! Document parsing.
//!
//! [`Document`] owns a `scraper` parse tree plus the URL it came from.
//! Parsing is lenient: anything except empty or binary input yields a tree
//! with a `<body>`, the way a browser would build one.
//!
//! ```rust
//! use mindvault_core::parse::Document;
//!
//! let doc = Document::parse("<title> Notes </title><ul><li>one<li>two</ul>").unwrap();
//! assert_eq!(doc.title().as_deref(), Some("Notes"));
//! assert_eq!(doc.select("li").unwrap().len(), 2);
//! ```

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::preprocess::{self, PreprocessConfig};
use crate::{ExtractError, Result};

/// A parsed page and, once known, its source URL
pub struct Document {
    html: Html,
    base_url: Option<Url>,
}

impl Document {
    /// Parses HTML from a string without preprocessing.
    ///
    /// The markup is kept as-is, scripts and styles included. This is the
    /// document the fallback path and metadata extraction read from.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::ParseFailure`] when the input is empty,
    /// whitespace-only, or carries NUL bytes.
    pub fn parse(html: &str) -> Result<Self> {
        check_parseable(html)?;
        let doc = Self { html: Html::parse_document(html), base_url: None };
        doc.ensure_body()?;
        Ok(doc)
    }

    /// Parses HTML from a string with preprocessing.
    ///
    /// Scripts, styles, comments, hidden and unlikely elements are scrubbed
    /// before parsing and relative links are resolved against `base_url`.
    pub fn parse_with_preprocessing(html: &str, base_url: Option<Url>, config: &PreprocessConfig) -> Result<Self> {
        check_parseable(html)?;

        let config = PreprocessConfig { base_url: base_url.clone(), ..config.clone() };
        let cleaned = preprocess::preprocess_html(html, &config);
        let doc = Self { html: Html::parse_document(&cleaned), base_url };
        doc.ensure_body()?;

        Ok(doc)
    }

    /// Attaches the URL the markup was fetched from.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// URL used for resolving relative links.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// The whole tree serialized back to markup.
    pub fn as_string(&self) -> String {
        self.html.html()
    }

    /// Every element matching a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::ParseFailure`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Text of the first `<title>` element.
    ///
    /// Whitespace is collapsed and trimmed the way a browser's
    /// `document.title` reports it. Returns `None` when there is no `<title>`
    /// element; an empty title yields `Some("")`.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| crate::article::collapse_whitespace(&el.text().collect::<String>()))
    }

    pub fn body(&'_ self) -> Option<Element<'_>> {
        let selector = Selector::parse("body").ok()?;
        self.html.select(&selector).next().map(|el| Element { element: el })
    }

    /// Trimmed `lang` attribute of `<html>`.
    pub fn lang(&self) -> Option<String> {
        self.html
            .root_element()
            .value()
            .attr("lang")
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .map(str::to_string)
    }

    /// Gets all text content from the document.
    ///
    /// Returns the concatenation of every text node, script and style
    /// contents included.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }

    fn ensure_body(&self) -> Result<()> {
        match self.body() {
            Some(_) => Ok(()),
            None => Err(ExtractError::parse_failure("document has no body")),
        }
    }
}

/// Borrowed view of one element in a [`Document`].
///
/// ```rust
/// use mindvault_core::parse::Document;
///
/// let doc = Document::parse(r#"<p>See <a rel="author" href="/sam">Sam</a></p>"#).unwrap();
/// let link = &doc.select("a[rel=author]").unwrap()[0];
/// assert_eq!((link.text().as_str(), link.attr("href")), ("Sam", Some("/sam")));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Markup of the children, as parsed.
    pub fn inner_html(&self) -> String {
        self.element.inner_html()
    }

    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Every descendant text node joined with no separator.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Descendants matching a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::ParseFailure`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }

    pub(crate) fn as_ref(&self) -> ElementRef<'a> {
        self.element
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ExtractError::parse_failure(format!("Invalid selector: {}", e)))
}

/// Rejects input that cannot be a document at all.
fn check_parseable(html: &str) -> Result<()> {
    if html.trim().is_empty() {
        return Err(ExtractError::parse_failure("document is empty"));
    }
    if html.contains('\0') {
        return Err(ExtractError::parse_failure("input contains NUL bytes, not markup"));
    }
    Ok(())
}
