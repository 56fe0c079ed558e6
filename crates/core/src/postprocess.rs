//! Cosmetic cleanup of serialized primary-path content.
//!
//! Passes here only touch markup (attributes, images, empty blocks). The
//! article text is settled before this runs, and link targets were already
//! resolved during preprocessing.

use std::sync::LazyLock;

use regex::Regex;

static EMPTY_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(div|p|section|article|header|blockquote)(?:\s[^>]*)?>\s*(?:<br>\s*)*</(div|p|section|article|header|blockquote)>")
        .expect("empty-block pattern is valid")
});

/// Configuration for HTML post-processing cleanup
#[derive(Debug, Clone)]
pub struct PostProcessConfig {
    /// Whether to remove empty nodes
    pub remove_empty_nodes: bool,
    /// Maximum passes for removing empty nodes
    pub max_empty_node_passes: usize,
    /// Whether to strip all images
    pub strip_images: bool,
    /// Whether to keep class attributes (default: false)
    pub keep_classes: bool,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self { remove_empty_nodes: true, max_empty_node_passes: 10, strip_images: false, keep_classes: false }
    }
}

/// Post-process extracted HTML by cleaning up remaining unwanted markup
pub fn postprocess_html(html: &str, config: &PostProcessConfig) -> String {
    let mut processed = html.to_string();

    if config.strip_images || !config.keep_classes {
        processed = strip_attributes_and_images(&processed, config.strip_images, !config.keep_classes);
    }

    if config.remove_empty_nodes {
        processed = remove_empty_nodes(&processed, config.max_empty_node_passes);
    }

    processed
}

fn run_rewriter(html: &str, settings: lol_html::Settings<'_, '_>, output: &mut String) -> bool {
    let mut rewriter = lol_html::HtmlRewriter::new(settings, |c: &[u8]| {
        output.push_str(&String::from_utf8_lossy(c));
    });

    rewriter.write(html.as_bytes()).is_ok() && rewriter.end().is_ok()
}

/// Strip `<img>` tags and/or `class` attributes in one pass
fn strip_attributes_and_images(html: &str, images: bool, classes: bool) -> String {
    let mut output = String::new();
    let settings = lol_html::Settings {
        element_content_handlers: vec![
            lol_html::element!("img", move |el| {
                if images {
                    el.remove();
                }
                Ok(())
            }),
            lol_html::element!("[class]", move |el| {
                if classes {
                    el.remove_attribute("class");
                }
                Ok(())
            }),
        ],
        ..Default::default()
    };

    if run_rewriter(html, settings, &mut output) { output } else { html.to_string() }
}

/// Remove empty block nodes from HTML
///
/// A block is empty when it holds nothing but whitespace and `<br>` tags.
/// Removal repeats so that blocks emptied by a previous pass go too.
fn remove_empty_nodes(html: &str, max_passes: usize) -> String {
    let mut result = html.to_string();

    for _ in 0..max_passes {
        let next = EMPTY_BLOCKS
            .replace_all(&result, |caps: &regex::Captures| {
                if caps[1] == caps[2] { String::new() } else { caps[0].to_string() }
            })
            .to_string();
        if next == result {
            break;
        }
        result = next;
    }

    result
}
