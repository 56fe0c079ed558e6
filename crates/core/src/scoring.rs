//! Content signals used to rank candidate containers.
//!
//! Every function here reads from a [`DomTree`] by node index and never
//! mutates it.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom_tree::{DomTree, NodeId};

/// Configuration for content scoring algorithm
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Weight for positive class/ID patterns
    pub positive_weight: f64,
    /// Weight for negative class/ID patterns
    pub negative_weight: f64,
    /// Maximum content score contributed by character count
    pub max_char_density_score: f64,
    /// Characters per point for content density scoring
    pub chars_per_point: usize,
    /// Minimum text length for an element to contribute a score
    pub min_text_len: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            positive_weight: 25.0,
            negative_weight: -25.0,
            max_char_density_score: 3.0,
            chars_per_point: 100,
            min_text_len: 25,
        }
    }
}

/// Positive patterns that suggest an element contains main content
static POSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(article|body|content|entry|hentry|h-entry|main|page|post|text|blog|story|tweet)")
        .expect("positive class pattern is valid")
});

/// Negative patterns that suggest an element does NOT contain main content
static NEGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(-ad-|hidden|^hid$| hid$| hid |^hid |banner|breadcrumbs?|combx|comment|community|disqus|extra|foot|header|menu|related|remark|rss|share|shoutbox|sidebar|skyscraper|social|sponsor|ad-break|agegate|pagination|pager|popup|promo|widget)")
        .expect("negative class pattern is valid")
});

/// Calculate the base score for an element based on its tag name
///
/// - ARTICLE: +10, SECTION: +8, DIV: +5
/// - TD, BLOCKQUOTE: +3
/// - FORM, ADDRESS, lists and list items: -3
/// - H1-H6, TH, HEADER, FOOTER, NAV: -5
pub fn base_tag_score(tag: &str) -> f64 {
    match tag {
        "article" => 10.0,
        "section" => 8.0,
        "div" => 5.0,
        "td" | "blockquote" => 3.0,
        "form" | "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" | "header" | "footer" | "nav" => -5.0,
        _ => 0.0,
    }
}

/// Class/ID weight for a single attribute value
fn name_weight(value: &str, config: &ScoreConfig) -> Option<f64> {
    if POSITIVE.is_match(value) {
        return Some(config.positive_weight);
    }
    if NEGATIVE.is_match(value) {
        return Some(config.negative_weight);
    }
    None
}

/// Calculate the class/ID weight adjustment for an element
///
/// The id is checked first, then each class name in order. The first name
/// that matches decides: positive patterns win over negative ones within a
/// single name.
pub fn class_id_weight(tree: &DomTree, id: NodeId, config: &ScoreConfig) -> f64 {
    if let Some(weight) = tree.attr(id, "id").and_then(|value| name_weight(value, config)) {
        return weight;
    }

    tree.attr(id, "class")
        .and_then(|class| class.split_whitespace().find_map(|name| name_weight(name, config)))
        .unwrap_or(0.0)
}

/// Score a paragraph-like element contributes to its ancestors
///
/// One point for existing, one per comma, and one per `chars_per_point`
/// characters up to `max_char_density_score`.
pub fn content_score(text: &str, config: &ScoreConfig) -> f64 {
    let commas = text.matches(',').count() as f64;
    let chars = (text.chars().count() / config.chars_per_point) as f64;
    1.0 + commas + chars.min(config.max_char_density_score)
}

/// Calculate the link density of an element
///
/// Link density is the ratio of link text characters to total text characters.
/// Returns a value from 0.0 (no links) to 1.0 (all text is in links).
pub fn link_density(tree: &DomTree, id: NodeId) -> f64 {
    let text_length = tree.text_len(id);
    if text_length == 0 {
        return 0.0;
    }
    (tree.link_text_len(id) as f64 / text_length as f64).min(1.0)
}

/// Initial candidate score: tag base score plus class/ID weight
pub fn initial_score(tree: &DomTree, id: NodeId, config: &ScoreConfig) -> f64 {
    let tag_score = tree.tag(id).map(base_tag_score).unwrap_or(0.0);
    tag_score + class_id_weight(tree, id, config)
}

/// Multiplier applied to a candidate's accumulated score
///
/// Elements with a positive class/ID or more than 500 characters of text
/// only take half the link-density penalty.
pub fn link_penalty(tree: &DomTree, id: NodeId, config: &ScoreConfig) -> f64 {
    let ld = link_density(tree, id);
    let has_positive_pattern = class_id_weight(tree, id, config) > 0.0;
    let is_content_rich = tree.text_len(id) > 500;

    if has_positive_pattern || is_content_rich { 1.0 - (ld * 0.5) } else { 1.0 - ld }
}
