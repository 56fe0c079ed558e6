//! Document metadata: title, description, byline, site name, publication
//! time and language.
//!
//! Everything here reads the unscrubbed document, since preprocessing
//! strips the `<script type="application/ld+json">` blocks most publishers
//! put their structured data in.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Document;
use crate::article::{UNTITLED, collapse_whitespace};

/// Optional metadata attached to a structured-path [`Article`](crate::Article)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub byline: Option<String>,
    pub site_name: Option<String>,
    pub published_time: Option<String>,
    pub language: Option<String>,
}

impl Metadata {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self == &Metadata::default()
    }
}

impl Document {
    /// Resolve the article title.
    ///
    /// A non-blank `<title>` wins. A blank `<title>` defers to title metadata
    /// and the first `<h1>`. A document with no `<title>` at all is
    /// [`UNTITLED`]. The result is never empty.
    pub fn resolve_title(&self) -> String {
        match self.title() {
            Some(title) if !title.is_empty() => title,
            Some(_) => self.extract_title().unwrap_or_else(|| UNTITLED.to_string()),
            None => UNTITLED.to_string(),
        }
    }

    /// Extract title metadata with priority fallback:
    /// 1. JSON-LD `headline`
    /// 2. Open Graph `og:title`
    /// 3. Twitter `twitter:title`
    /// 4. Meta `title` / `DC.title`
    /// 5. First non-blank `<h1>` element
    pub fn extract_title(&self) -> Option<String> {
        self.json_ld_string("headline")
            .or_else(|| self.get_meta_content("og:title"))
            .or_else(|| self.get_meta_content("twitter:title"))
            .or_else(|| self.get_meta_content("title"))
            .or_else(|| self.get_meta_content("DC.title"))
            .or_else(|| self.first_text("h1"))
    }

    /// Extract a description with priority fallback:
    /// 1. JSON-LD `description`
    /// 2. Open Graph `og:description`
    /// 3. Meta `description`
    pub fn extract_description(&self) -> Option<String> {
        self.json_ld_string("description")
            .or_else(|| self.get_meta_content("og:description"))
            .or_else(|| self.get_meta_content("description"))
    }

    /// Extract author with priority fallback:
    /// 1. JSON-LD `author` (string, object or first array entry)
    /// 2. Meta `author` / `DC.creator`
    /// 3. `[rel="author"]` link text
    /// 4. `[itemprop="author"]` text
    /// 5. Short text in an element whose class contains "byline" or "author"
    pub fn extract_byline(&self) -> Option<String> {
        if let Some(name) = self.json_ld_objects().iter().find_map(|obj| obj.get("author").and_then(author_name)) {
            return Some(name);
        }

        self.get_meta_content("author")
            .or_else(|| self.get_meta_content("DC.creator"))
            .or_else(|| self.first_text("[rel=\"author\"]"))
            .or_else(|| self.first_text("[itemprop=\"author\"]"))
            .or_else(|| {
                ["byline", "author"].into_iter().find_map(|pattern| {
                    self.select(&format!("[class*=\"{pattern}\"]"))
                        .unwrap_or_default()
                        .iter()
                        .take(3)
                        .map(|el| collapse_whitespace(&el.text()))
                        .find(|text| !text.is_empty() && text.chars().count() < 100)
                })
            })
    }

    /// Extract publication time with priority fallback:
    /// 1. JSON-LD `datePublished`
    /// 2. Meta `article:published_time`
    /// 3. `<time datetime="">` element
    /// 4. Meta `date` / `DC.date`
    pub fn extract_published_time(&self) -> Option<String> {
        self.json_ld_string("datePublished")
            .or_else(|| self.get_meta_content("article:published_time"))
            .or_else(|| {
                self.select("time[datetime]")
                    .unwrap_or_default()
                    .first()
                    .and_then(|el| el.attr("datetime"))
                    .map(collapse_whitespace)
                    .filter(|value| !value.is_empty())
            })
            .or_else(|| self.get_meta_content("date"))
            .or_else(|| self.get_meta_content("DC.date"))
    }

    /// Extract site name with priority fallback:
    /// 1. Open Graph `og:site_name`
    /// 2. JSON-LD `publisher.name`
    pub fn extract_site_name(&self) -> Option<String> {
        self.get_meta_content("og:site_name").or_else(|| {
            self.json_ld_objects().iter().find_map(|obj| {
                obj.get("publisher")
                    .and_then(|publisher| publisher.get("name"))
                    .and_then(Value::as_str)
                    .map(collapse_whitespace)
                    .filter(|name| !name.is_empty())
            })
        })
    }

    /// Extract all optional metadata at once
    pub fn extract_metadata(&self) -> Metadata {
        Metadata {
            byline: self.extract_byline(),
            site_name: self.extract_site_name(),
            published_time: self.extract_published_time(),
            language: self.lang(),
        }
    }

    /// Get meta tag content by name or property attribute
    fn get_meta_content(&self, attr: &str) -> Option<String> {
        ["name", "property"].into_iter().find_map(|key| {
            self.select(&format!("meta[{key}=\"{attr}\"]"))
                .unwrap_or_default()
                .first()
                .and_then(|el| el.attr("content"))
                .map(collapse_whitespace)
                .filter(|content| !content.is_empty())
        })
    }

    /// Collapsed text of the first non-blank element matching `selector`
    fn first_text(&self, selector: &str) -> Option<String> {
        self.select(selector)
            .unwrap_or_default()
            .iter()
            .map(|el| collapse_whitespace(&el.text()))
            .find(|text| !text.is_empty())
    }

    /// Every JSON-LD object on the page, arrays and `@graph` lists flattened
    fn json_ld_objects(&self) -> Vec<Value> {
        let mut objects = Vec::new();
        for el in self.select("script[type=\"application/ld+json\"]").unwrap_or_default() {
            let Ok(value) = serde_json::from_str::<Value>(el.text().trim()) else {
                continue;
            };
            let mut pending = vec![value];
            while let Some(value) = pending.pop() {
                match value {
                    Value::Array(items) => pending.extend(items.into_iter().rev()),
                    Value::Object(mut map) => {
                        let graph = map.remove("@graph");
                        objects.push(Value::Object(map));
                        if let Some(graph) = graph {
                            pending.push(graph);
                        }
                    }
                    _ => {}
                }
            }
        }
        objects
    }

    /// First non-blank string value for `key` across JSON-LD objects
    fn json_ld_string(&self, key: &str) -> Option<String> {
        self.json_ld_objects().iter().find_map(|obj| {
            obj.get(key).and_then(Value::as_str).map(collapse_whitespace).filter(|value| !value.is_empty())
        })
    }
}

/// Author name from a JSON-LD `author` field in string, object or array form
fn author_name(author: &Value) -> Option<String> {
    match author {
        Value::String(name) => Some(collapse_whitespace(name)).filter(|name| !name.is_empty()),
        Value::Object(obj) => obj.get("name").and_then(author_name),
        Value::Array(items) => items.iter().find_map(author_name),
        _ => None,
    }
}
