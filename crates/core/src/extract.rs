//! Primary-path content extraction.
//!
//! The document body is copied into a [`DomTree`], boilerplate is pruned,
//! paragraph-like elements push scores up to their ancestors, and the best
//! scoring container (plus qualifying siblings) is cleaned and serialized.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::article::collapse_whitespace;
use crate::dom_tree::{DomTree, NodeId, is_block_tag};
use crate::parse::Document;
use crate::postprocess::{PostProcessConfig, postprocess_html};
use crate::scoring::{ScoreConfig, class_id_weight, content_score, initial_score, link_density, link_penalty};
use crate::{ExtractError, Result};

/// Tags dropped before scoring
const BOILERPLATE_TAGS: &[&str] =
    &["nav", "footer", "aside", "form", "button", "input", "select", "textarea", "object", "embed"];

/// ARIA roles dropped before scoring
const BOILERPLATE_ROLES: &[&str] =
    &["navigation", "menu", "menubar", "complementary", "banner", "contentinfo", "dialog", "alert", "alertdialog"];

/// Tags that contribute content scores to their ancestors
const SCORABLE_TAGS: &[&str] = &["p", "pre", "td", "section", "h2", "h3", "h4", "h5", "h6"];

/// Containers removed during cleaning when mostly links
const CONDITIONAL_TAGS: &[&str] = &["div", "section", "ul", "ol", "table"];

/// Elements that are kept even with no text
const KEEP_WHEN_EMPTY: &[&str] =
    &["img", "br", "hr", "video", "audio", "source", "picture", "iframe", "td", "th", "tr", "col", "math"];

/// How many ancestor levels receive a share of an element's score
const ANCESTOR_LEVELS: usize = 5;

/// Configuration for content extraction
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Minimum score for the top candidate; below it the whole body is used
    pub min_score: f64,
    /// Number of top candidates kept after ranking
    pub nb_top_candidates: usize,
    /// Sibling score threshold (multiplier of top score)
    pub sibling_threshold: f64,
    /// Link density above which containers are dropped during cleaning
    pub max_link_density: f64,
    /// Arena node cap, `0` for unlimited
    pub max_elems_to_parse: usize,
    /// Scoring weights
    pub scoring: ScoreConfig,
    /// Post-processing configuration
    pub postprocess: PostProcessConfig,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_score: 20.0,
            nb_top_candidates: 5,
            sibling_threshold: 0.2,
            max_link_density: 0.5,
            max_elems_to_parse: 0,
            scoring: ScoreConfig::default(),
            postprocess: PostProcessConfig::default(),
        }
    }
}

/// The result of content extraction
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedContent {
    /// Cleaned, post-processed content markup
    pub content: String,
    /// Flattened, whitespace-collapsed text of the cleaned content
    pub text_content: String,
    /// First paragraph of the content with at least 25 characters
    pub first_paragraph: Option<String>,
    /// Score of the chosen container, `None` when the body was used
    pub top_score: Option<f64>,
    /// Number of top-level nodes merged into the content
    pub element_count: usize,
}

/// Extract the main content from a preprocessed document
///
/// # Errors
///
/// Returns [`ExtractError::NoExtractableContent`] when the document has no
/// body, the body exceeds `max_elems_to_parse`, or the cleaned content has
/// no text. Callers treat this as the signal to fall back.
pub fn extract_content(doc: &Document, config: &ExtractConfig) -> Result<ExtractedContent> {
    let body = doc.body().ok_or(ExtractError::NoExtractableContent)?;
    let Some(mut tree) = DomTree::build(&body, config.max_elems_to_parse) else {
        debug!(limit = config.max_elems_to_parse, "element cap exceeded, skipping structured extraction");
        return Err(ExtractError::NoExtractableContent);
    };

    prune_boilerplate(&mut tree);

    let candidates = score_candidates(&tree, &config.scoring);
    let ranked = rank_candidates(&tree, candidates, config);

    let (top, top_score) = match ranked.first() {
        Some(&(id, score)) if score >= config.min_score => (id, Some(score)),
        Some(&(_, score)) => {
            debug!(score, min_score = config.min_score, "top candidate below minimum, using body");
            (tree.root(), None)
        }
        None => {
            debug!("no scorable content, using body");
            (tree.root(), None)
        }
    };

    let scores: BTreeMap<NodeId, f64> = ranked.iter().copied().collect();
    let merged = match top_score {
        Some(score) => merge_siblings(&tree, top, score, &scores, config),
        None => vec![top],
    };

    for &node in &merged {
        clean_subtree(&mut tree, node, config);
    }

    let text_content =
        collapse_whitespace(&merged.iter().map(|&node| tree.flatten_text(node)).collect::<Vec<_>>().join(" "));
    if text_content.is_empty() {
        debug!("structured extraction produced no text");
        return Err(ExtractError::NoExtractableContent);
    }

    let first_paragraph = merged
        .iter()
        .flat_map(|&node| {
            let mut paragraphs = tree.descendants_by_tag(node, "p");
            if tree.tag(node) == Some("p") {
                paragraphs.insert(0, node);
            }
            paragraphs
        })
        .map(|p| tree.inner_text(p))
        .find(|text| text.chars().count() >= config.scoring.min_text_len);

    let markup = serialize(&tree, doc, &merged);
    let content = postprocess_html(&markup, &config.postprocess);

    Ok(ExtractedContent { content, text_content, first_paragraph, top_score, element_count: merged.len() })
}

/// Detach navigation, forms and landmark furniture by tag or ARIA role
fn prune_boilerplate(tree: &mut DomTree) {
    let doomed: Vec<NodeId> = tree
        .descendants(tree.root())
        .into_iter()
        .skip(1)
        .filter(|&id| {
            tree.tag(id).is_some_and(|tag| BOILERPLATE_TAGS.contains(&tag))
                || tree.attr(id, "role").is_some_and(|role| {
                    role.split_whitespace().any(|r| BOILERPLATE_ROLES.contains(&r.to_ascii_lowercase().as_str()))
                })
        })
        .collect();

    for id in doomed {
        tree.detach(id);
    }
}

fn is_scorable(tree: &DomTree, id: NodeId) -> bool {
    match tree.tag(id) {
        Some("div") => !tree.element_children(id).into_iter().any(|child| tree.tag(child).is_some_and(is_block_tag)),
        Some(tag) => SCORABLE_TAGS.contains(&tag),
        None => false,
    }
}

/// Accumulate content scores onto ancestors
///
/// Parents receive the full score, grandparents half, and each further
/// level `score / (level * 3)`.
fn score_candidates(tree: &DomTree, config: &ScoreConfig) -> BTreeMap<NodeId, f64> {
    let mut candidates: BTreeMap<NodeId, f64> = BTreeMap::new();

    for id in tree.descendants(tree.root()) {
        if !is_scorable(tree, id) {
            continue;
        }
        let text = tree.inner_text(id);
        if text.chars().count() < config.min_text_len {
            continue;
        }

        let score = content_score(&text, config);
        for (level, ancestor) in tree.ancestors(id).into_iter().take(ANCESTOR_LEVELS).enumerate() {
            let divider = match level {
                0 => 1.0,
                1 => 2.0,
                _ => level as f64 * 3.0,
            };
            *candidates.entry(ancestor).or_insert_with(|| initial_score(tree, ancestor, config)) += score / divider;
        }
    }

    candidates
}

/// Apply the link-density penalty and keep the best candidates, best first
fn rank_candidates(tree: &DomTree, candidates: BTreeMap<NodeId, f64>, config: &ExtractConfig) -> Vec<(NodeId, f64)> {
    let mut ranked: Vec<(NodeId, f64)> = candidates
        .into_iter()
        .map(|(id, score)| (id, score * link_penalty(tree, id, &config.scoring)))
        .collect();

    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(config.nb_top_candidates.max(1));

    for (id, score) in &ranked {
        trace!(node = id, tag = tree.tag(*id).unwrap_or_default(), score, "candidate");
    }

    ranked
}

/// Collect the top candidate and the siblings worth keeping, in document order
fn merge_siblings(
    tree: &DomTree, top: NodeId, top_score: f64, scores: &BTreeMap<NodeId, f64>, config: &ExtractConfig,
) -> Vec<NodeId> {
    let Some(parent) = tree.parent(top) else {
        return vec![top];
    };

    let threshold = (top_score * config.sibling_threshold).max(10.0);
    let top_class = tree.attr(top, "class").filter(|class| !class.is_empty());

    tree.element_children(parent)
        .into_iter()
        .filter(|&sibling| {
            if sibling == top {
                return true;
            }

            let mut bonus = 0.0;
            if top_class.is_some() && tree.attr(sibling, "class") == top_class {
                bonus = top_score * 0.2;
            }
            if let Some(score) = scores.get(&sibling)
                && score + bonus >= threshold
            {
                return true;
            }

            if tree.tag(sibling) != Some("p") {
                return false;
            }
            let text = tree.inner_text(sibling);
            let len = text.chars().count();
            let density = link_density(tree, sibling);
            if len > 80 {
                density < 0.25
            } else {
                len > 0 && density == 0.0 && ends_sentence(&text)
            }
        })
        .collect()
}

fn ends_sentence(text: &str) -> bool {
    text.ends_with('.') || text.contains(". ")
}

/// Remove link farms, negative headings and empty elements below `root`
fn clean_subtree(tree: &mut DomTree, root: NodeId, config: &ExtractConfig) {
    for id in tree.descendants(root).into_iter().skip(1) {
        if !tree.is_attached(id) {
            continue;
        }
        let Some(tag) = tree.tag(id) else {
            continue;
        };

        let drop = if CONDITIONAL_TAGS.contains(&tag) {
            let weight = class_id_weight(tree, id, &config.scoring);
            link_density(tree, id) > config.max_link_density || weight < 0.0
        } else if matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6") {
            class_id_weight(tree, id, &config.scoring) < 0.0
        } else {
            false
        };

        if drop {
            trace!(node = id, tag, "dropping during cleanup");
            tree.detach(id);
        }
    }

    // Children come before parents in reverse document order, so emptied
    // parents are caught in the same sweep.
    for id in tree.descendants(root).into_iter().skip(1).rev() {
        let Some(tag) = tree.tag(id) else {
            continue;
        };
        if KEEP_WHEN_EMPTY.contains(&tag) || !tree.element_children(id).is_empty() {
            continue;
        }
        if tree.flatten_text(id).trim().is_empty() {
            tree.detach(id);
        }
    }
}

/// Serialize the merged nodes through html5ever, inside a single wrapper
fn serialize(tree: &DomTree, doc: &Document, nodes: &[NodeId]) -> String {
    let pruned = tree.pruned_copy(doc.html());
    let mut markup = String::from("<div>");
    for &node in nodes {
        let Some(element) = tree.source_element(&pruned, node) else {
            continue;
        };
        if node == tree.root() {
            markup.push_str(&element.inner_html());
        } else {
            markup.push_str(&element.html());
        }
    }
    markup.push_str("</div>");
    markup
}
