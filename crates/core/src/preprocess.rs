//! Markup scrub run before the primary path.
//!
//! Each concern is one streaming lol_html pass over the raw markup, so the
//! tree the scorer sees never contains scripts, hidden blocks or obvious
//! page furniture.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Class/ID fragments that mark page furniture rather than article content
pub(crate) static UNLIKELY_CANDIDATES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(-ad-|ad-break|agegate|banner|breadcrumbs?|combx|comment|community|cover-wrap|disqus|extra|foot|gdpr|header|legends|menu|related|remark|replies|rss|shoutbox|sidebar|skyscraper|social|sponsor|supplemental|pagination|pager|popup|yom-remote)",
    )
    .expect("unlikely-candidate pattern is valid")
});

/// Class/ID fragments that rescue an otherwise unlikely element
pub(crate) static MAYBE_CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(and|article|body|column|content|main|shadow|entry|hentry|h-entry|page|post|text|blog|story)")
        .expect("positive-candidate pattern is valid")
});

static COMMENTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));

static HIDDEN_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(display\s*:\s*none|visibility\s*:\s*hidden)").expect("hidden-style pattern is valid")
});

/// Tags dropped along with everything inside them
pub const STRIPPED_TAGS: &[&str] = &["script", "style", "noscript", "iframe", "svg", "canvas"];

/// Tags never considered for unlikely-candidate removal
const PROTECTED_TAGS: &[&str] = &["html", "body", "article", "main", "a"];

type Handlers<'h> = Vec<(Cow<'h, lol_html::Selector>, lol_html::ElementContentHandlers<'h>)>;

/// Settings for the scrub
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Elements removed with their contents
    pub strip_tags: &'static [&'static str],
    /// Drop elements whose class or id looks like page furniture
    pub remove_unlikely: bool,
    /// Spare unlikely elements that also carry a content-ish class or id
    pub keep_positive: bool,
    /// Drop `hidden` elements and inline `display:none`/`visibility:hidden`
    pub remove_hidden: bool,
    /// Resolve relative `href`/`src` against this URL when set
    pub base_url: Option<Url>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self { strip_tags: STRIPPED_TAGS, remove_unlikely: true, keep_positive: true, remove_hidden: true, base_url: None }
    }
}

/// Scrub `html` for the primary path.
///
/// Passes run in a fixed order: stripped tags, comments, unlikely
/// candidates, hidden elements, URL resolution. Whitespace is left alone so
/// `<pre>` and `<textarea>` blocks keep their line breaks.
pub fn preprocess_html(html: &str, config: &PreprocessConfig) -> String {
    let mut processed = remove_tags(html, config.strip_tags);
    processed = remove_comments(&processed);

    if config.remove_unlikely {
        processed = remove_unlikely_candidates(&processed, config.keep_positive);
    }
    if config.remove_hidden {
        processed = remove_hidden_elements(&processed);
    }
    if let Some(base_url) = &config.base_url {
        processed = convert_relative_urls(&processed, base_url);
    }

    processed
}

/// Runs one lol_html pass, returning the input untouched if rewriting fails
fn rewrite(html: &str, handlers: Handlers<'_>) -> String {
    if handlers.is_empty() {
        return html.to_string();
    }

    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings { element_content_handlers: handlers, ..Default::default() },
        |c: &[u8]| output.push_str(&String::from_utf8_lossy(c)),
    );

    if rewriter.write(html.as_bytes()).is_err() || rewriter.end().is_err() {
        return html.to_string();
    }

    output
}

fn remove_tags(html: &str, tags: &[&str]) -> String {
    let handlers = tags
        .iter()
        .map(|tag| {
            lol_html::element!(tag, |el| {
                el.remove();
                Ok(())
            })
        })
        .collect();

    rewrite(html, handlers)
}

fn remove_comments(html: &str) -> String {
    COMMENTS.replace_all(html, "").into_owned()
}

fn is_unlikely(name: &str, keep_positive: bool) -> bool {
    UNLIKELY_CANDIDATES.is_match(name) && !(keep_positive && MAYBE_CANDIDATE.is_match(name))
}

/// Drop furniture-looking elements, judged by id first and then each class
fn remove_unlikely_candidates(html: &str, keep_positive: bool) -> String {
    let handlers = vec![lol_html::element!("*", |el| {
        if PROTECTED_TAGS.contains(&el.tag_name().as_str()) {
            return Ok(());
        }

        let by_id = el.get_attribute("id").is_some_and(|id| is_unlikely(&id, keep_positive));
        let by_class = el
            .get_attribute("class")
            .is_some_and(|class| class.split_whitespace().any(|name| is_unlikely(name, keep_positive)));

        if by_id || by_class {
            el.remove();
        }
        Ok(())
    })];

    rewrite(html, handlers)
}

/// Resolve relative link and media URLs against `base_url`.
///
/// Fragment-only links are left alone.
pub fn convert_relative_urls(html: &str, base_url: &Url) -> String {
    let mut handlers: Handlers<'_> = Vec::new();

    for tag in ["a", "link"] {
        handlers.push(lol_html::element!(tag, |el| {
            if let Some(href) = el.get_attribute("href")
                && !href.starts_with('#')
                && let Ok(absolute) = base_url.join(&href)
            {
                el.set_attribute("href", absolute.as_str()).ok();
            }
            Ok(())
        }));
    }

    for tag in ["img", "source", "video", "audio"] {
        handlers.push(lol_html::element!(tag, |el| {
            if let Some(src) = el.get_attribute("src")
                && let Ok(absolute) = base_url.join(&src)
            {
                el.set_attribute("src", absolute.as_str()).ok();
            }
            Ok(())
        }));
    }

    rewrite(html, handlers)
}

fn remove_hidden_elements(html: &str) -> String {
    let handlers = vec![lol_html::element!("*", |el| {
        let hidden_style = el.get_attribute("style").is_some_and(|style| HIDDEN_STYLE.is_match(&style));
        if el.has_attribute("hidden") || hidden_style {
            el.remove();
        }
        Ok(())
    })];

    rewrite(html, handlers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stripped_tags_take_contents() {
        let html = r#"<div>
            <script>track("view")</script><style>.x{color:blue}</style>
            <noscript>Turn on scripts</noscript><iframe src="/ad"></iframe>
            <svg><circle r="4"/></svg><canvas></canvas>
            <p>Body copy</p>
        </div>"#;

        let result = remove_tags(html, STRIPPED_TAGS);
        for gone in ["<script", "track(", "color:blue", "Turn on scripts", "<iframe", "<svg", "<canvas"] {
            assert!(!result.contains(gone), "{gone} survived");
        }
        assert!(result.contains("<p>Body copy</p>"));
    }

    #[test]
    fn test_strip_tags_is_configurable() {
        let html = "<div><script>keep()</script><style>p{}</style></div>";
        let result = remove_tags(html, &["style"]);
        assert!(result.contains("keep()"));
        assert!(!result.contains("<style"));
    }

    #[test]
    fn test_comments_removed() {
        let html = "<p>before</p><!-- note\n spanning lines --><p>after</p>";
        assert_eq!(remove_comments(html), "<p>before</p><p>after</p>");
    }

    #[test]
    fn test_unlikely_candidates_removed() {
        let html = r#"<body>
            <div id="breadcrumbs">Home / Blog</div>
            <div class="gdpr notice">Cookie banner</div>
            <div class="post-body">Kept text</div>
            <div id="content">Also kept</div>
        </body>"#;

        let result = remove_unlikely_candidates(html, true);
        assert!(!result.contains("Home / Blog"));
        assert!(!result.contains("Cookie banner"));
        assert!(result.contains("Kept text"));
        assert!(result.contains("Also kept"));
    }

    #[test]
    fn test_positive_rescue_can_be_disabled() {
        let html = r#"<section class="comments-main">Reply thread</section>"#;
        assert!(remove_unlikely_candidates(html, true).contains("Reply thread"));
        assert!(!remove_unlikely_candidates(html, false).contains("Reply thread"));
    }

    #[test]
    fn test_protected_tags_survive() {
        let html = r#"<body class="has-sidebar"><main id="footer-wrap"><a class="menu-link" href="/">Home</a></main></body>"#;
        let result = remove_unlikely_candidates(html, true);
        assert!(result.contains("Home"));
    }

    #[test]
    fn test_relative_urls_resolved() {
        let base = Url::parse("https://news.example.org/2024/05/story.html").unwrap();
        let html = r##"<a href="../archive">A</a><a href="#notes">N</a><img src="fig.png"><video src="/v.mp4"></video>"##;

        let result = convert_relative_urls(html, &base);
        assert!(result.contains(r#"href="https://news.example.org/2024/archive""#));
        assert!(result.contains(r##"href="#notes""##));
        assert!(result.contains(r#"src="https://news.example.org/2024/05/fig.png""#));
        assert!(result.contains(r#"src="https://news.example.org/v.mp4""#));
    }

    #[test]
    fn test_hidden_elements_removed() {
        let html = r#"<div style="DISPLAY: none">a</div><span style="visibility:hidden">b</span><p hidden>c</p><p>d</p>"#;
        assert_eq!(remove_hidden_elements(html), "<p>d</p>");
    }

    #[test]
    fn test_markup_of_only_stripped_tags_empties() {
        assert_eq!(remove_tags("<canvas>Your browser lacks canvas support</canvas>", STRIPPED_TAGS), "");
        assert_eq!(preprocess_html("<svg><text>logo</text></svg><iframe src=\"/w\"></iframe>", &PreprocessConfig::default()), "");
    }

    #[test]
    fn test_preformatted_whitespace_kept() {
        let html = "<pre>fn main() {\n    run();\n}</pre><textarea>a\n\nb</textarea>";
        assert_eq!(preprocess_html(html, &PreprocessConfig::default()), html);
    }

    #[test]
    fn test_preprocess_pipeline() {
        let html = r#"<!DOCTYPE html>
            <html><head><script>var a;</script><!-- build 42 --></head>
            <body>
                <nav class="menu"><a href="/">Home</a></nav>
                <div class="entry">
                    <p style="display:none">Secret</p>
                    <p>Visible <a href="/more">more</a></p>
                </div>
            </body></html>"#;
        let config = PreprocessConfig { base_url: Some(Url::parse("https://example.com").unwrap()), ..Default::default() };

        let result = preprocess_html(html, &config);
        assert!(!result.contains("var a"));
        assert!(!result.contains("build 42"));
        assert!(!result.contains("Home"));
        assert!(!result.contains("Secret"));
        assert!(result.contains(r#"href="https://example.com/more""#));
    }

    #[test]
    fn test_unlikely_removal_can_be_disabled() {
        let config = PreprocessConfig { remove_unlikely: false, ..Default::default() };
        let result = preprocess_html(r#"<div class="sidebar">Related links</div>"#, &config);
        assert!(result.contains("Related links"));
    }
}
