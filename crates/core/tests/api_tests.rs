//! Library API integration tests
use mindvault_core::{
    Document, ExtractError, Extracted, ExtractionPath, Extractor, ExtractorConfig, OutputFormat, extract, extract_fallback,
};
use proptest::prelude::*;
use rstest::rstest;

const URL: &str = "https://example.com/posts/ownership";

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(get_fixture_path(name)).unwrap()
}

fn assert_collapsed(text: &str) {
    assert_eq!(text.trim(), text, "untrimmed text: {text:?}");
    assert!(!text.contains("  "), "double space in {text:?}");
    assert!(!text.chars().any(|c| c.is_whitespace() && c != ' '), "non-space whitespace in {text:?}");
}

#[test]
fn test_hello_world_scenario() {
    let html = "<html><head><title>Hi</title></head><body><script>var x=1;</script><p>Hello   world</p></body></html>";
    let extracted = extract(html, "https://example.com/a").unwrap();
    let article = extracted.article();

    assert_eq!(article.title, "Hi");
    assert_eq!(article.text_content, "Hello world");
    assert_eq!(article.excerpt, "Hello world");
    assert_eq!(article.length, 11);
}

#[test]
fn test_empty_body_not_extractable() {
    let result = extract("<html><body></body></html>", URL);
    assert_eq!(result, Err(ExtractError::NoExtractableContent));
}

#[test]
fn test_empty_string_parse_failure() {
    let result = extract("", URL);
    assert!(matches!(result, Err(ExtractError::ParseFailure { .. })));
}

#[test]
fn test_article_fixture() {
    let extracted = extract(&read_fixture("article.html"), URL).expect("should extract");
    assert_eq!(extracted.path(), ExtractionPath::Structured);

    let article = extracted.article();
    assert_eq!(article.title, "Understanding Ownership in Rust | The Field Notes");
    assert!(article.text_content.starts_with("Understanding Ownership in Rust By Sam Rivera Ownership is the feature"));
    assert!(article.text_content.contains("Lifetimes describe how long references are valid."));
    assert!(article.text_content.ends_with("the rules for elision in detail."));
    assert_collapsed(&article.text_content);

    for boilerplate in ["Archive", "Popular posts", "Share on Twitter", "Great write-up", "Copyright", "dataLayer"] {
        assert!(!article.text_content.contains(boilerplate), "leaked {boilerplate:?}");
    }
}

#[test]
fn test_article_fixture_metadata() {
    let article = extract(&read_fixture("article.html"), URL).unwrap().into_article();

    assert_eq!(
        article.excerpt,
        "A practical walk through moves, borrows and lifetimes, with the mistakes that show up most often in code review."
    );
    assert_eq!(article.metadata.byline.as_deref(), Some("Sam Rivera"));
    assert_eq!(article.metadata.site_name.as_deref(), Some("The Field Notes"));
    assert_eq!(article.metadata.published_time.as_deref(), Some("2024-05-02T09:00:00Z"));
    assert_eq!(article.metadata.language.as_deref(), Some("en"));
}

#[test]
fn test_article_fixture_content_links() {
    let article = extract(&read_fixture("article.html"), URL).unwrap().into_article();

    assert!(article.content.contains(r#"src="https://example.com/images/borrows.png""#));
    assert!(article.content.contains(r#"href="https://example.com/posts/lifetimes-deep-dive""#));
    assert!(!article.content.contains("class="));
    assert!(!article.content.contains("<script"));
}

#[test]
fn test_no_title_is_untitled() {
    let extracted = extract(&read_fixture("no_title.html"), URL).unwrap();
    assert_eq!(extracted.article().title, "Untitled");
    assert_eq!(
        extracted.article().text_content,
        "Release notes Version 2.3 adds offline search, faster sync, and a reworked import screen for large libraries."
    );
}

#[test]
fn test_scripts_only_equals_fallback() {
    let html = read_fixture("scripts_only.html");
    let extracted = extract(&html, URL).unwrap();
    assert!(extracted.is_fallback());

    let doc = Document::parse(&html).unwrap();
    let expected = extract_fallback(&doc).unwrap();
    assert_eq!(extracted.into_article(), expected);
    assert_eq!(expected.title, "Loading");
    assert_eq!(expected.text_content, "window.__APP_STATE__ = { ready: false };");
}

#[rstest]
#[case("<canvas>Your browser lacks canvas support</canvas>")]
#[case("<svg><text>Company logo</text></svg>")]
#[case("<iframe>Embedded player</iframe>")]
#[case("<html><head><title>Widget</title></head><body><noscript>Enable JavaScript</noscript><style>p{}</style></body></html>")]
fn test_stripped_only_markup_equals_fallback(#[case] html: &str) {
    let extracted = extract(html, URL).unwrap();
    let expected = extract_fallback(&Document::parse(html).unwrap()).unwrap();
    assert_eq!(extracted, Extracted::Fallback(expected));
}

#[test]
fn test_preformatted_content_keeps_line_breaks() {
    let html = "<html><body><article>\
        <p>Build the release binary with the command below, then copy it to the server.</p>\
        <pre>cargo build\n\n    --release</pre>\
        </article></body></html>";
    let extracted = extract(html, URL).unwrap();
    assert_eq!(extracted.path(), ExtractionPath::Structured);

    let article = extracted.article();
    assert!(article.content.contains("<pre>cargo build\n\n    --release</pre>"), "{}", article.content);
    assert_collapsed(&article.text_content);
    assert!(article.text_content.ends_with("cargo build --release"));
}

#[test]
fn test_unicode_fixture() {
    let article = extract(&read_fixture("unicode.html"), URL).unwrap().into_article();

    assert_eq!(article.title, "東京の喫茶店ガイド");
    assert!(article.text_content.contains("神保町、銀座、浅草"));
    assert!(article.text_content.contains("naïve visitors included."));
    assert!(article.excerpt.chars().count() <= 200);
    assert_eq!(article.metadata.language.as_deref(), Some("ja"));
}

#[test]
fn test_malformed_fixture() {
    let article = extract(&read_fixture("malformed.html"), URL).unwrap().into_article();

    assert_eq!(article.title, "Unclosed tags");
    assert!(article.text_content.contains("First paragraph without a closing tag"));
    assert!(article.text_content.contains("cell text"));
    assert_collapsed(&article.text_content);
}

#[rstest]
#[case("article.html", Some(ExtractionPath::Structured))]
#[case("no_title.html", Some(ExtractionPath::Structured))]
#[case("unicode.html", Some(ExtractionPath::Structured))]
#[case("scripts_only.html", Some(ExtractionPath::Fallback))]
#[case("empty_content.html", None)]
fn test_fixture_paths(#[case] fixture: &str, #[case] expected: Option<ExtractionPath>) {
    let result = extract(&read_fixture(fixture), URL);
    match expected {
        Some(path) => assert_eq!(result.unwrap().path(), path),
        None => assert_eq!(result, Err(ExtractError::NoExtractableContent)),
    }
}

#[rstest]
#[case("not a url")]
#[case("/relative/path")]
#[case("")]
fn test_invalid_urls(#[case] url: &str) {
    let result = extract(&read_fixture("article.html"), url);
    assert!(matches!(result, Err(ExtractError::InvalidUrl(_))));
}

#[rstest]
#[case("   \n\t  ")]
#[case("\u{0}\u{0}\u{1}binary")]
fn test_unparseable_inputs(#[case] html: &str) {
    let err = extract(html, URL).unwrap_err();
    assert!(matches!(err, ExtractError::ParseFailure { .. }));
    assert!(err.is_unreadable());
}

#[test]
fn test_extractor_config_builder_api() {
    let config = ExtractorConfig::builder().min_score(10.0).keep_classes(true).preserve_images(false).build();
    let extractor = Extractor::with_config(config);
    let article = extractor.extract(&read_fixture("article.html"), URL).unwrap().into_article();

    assert!(article.content.contains("class="));
    assert!(!article.content.contains("<img"));
}

#[test]
fn test_excerpt_truncated_on_word_boundary() {
    let sentence = "Every word in this paragraph is ordinary, and there are many of them, repeated. ";
    let html = format!("<html><head><title>Long</title></head><body><p>{}</p></body></html>", sentence.repeat(10));
    let article = extract(&html, URL).unwrap().into_article();

    assert!(article.excerpt.chars().count() <= 200);
    assert!(article.text_content.starts_with(&article.excerpt));
    assert!(!article.excerpt.ends_with(' '));
    let next = article.text_content[article.excerpt.len()..].chars().next();
    assert_eq!(next, Some(' '));
}

#[test]
fn test_output_formats() {
    let article = extract(&read_fixture("article.html"), URL).unwrap().into_article();

    let json = article.to_json().unwrap();
    assert!(json.get("metadata").is_some());
    assert_eq!(article.to_format(OutputFormat::PlainText).unwrap(), article.text_content);
    assert_eq!(article.to_format(OutputFormat::Html).unwrap(), article.content);
}

#[test]
fn test_extractor_shared_across_threads() {
    let extractor = std::sync::Arc::new(Extractor::new());
    let html = std::sync::Arc::new(read_fixture("article.html"));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let extractor = extractor.clone();
            let html = html.clone();
            std::thread::spawn(move || extractor.extract(&html, URL))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
}

fn block() -> impl Strategy<Value = String> {
    let text = "[a-zA-Z ,.\n\t]{0,160}";
    prop_oneof![
        text.prop_map(|t| format!("<p>{t}</p>")),
        text.prop_map(|t| format!("<div class=\"content\">{t}</div>")),
        text.prop_map(|t| format!("<nav><a href=\"/x\">{t}</a></nav>")),
        text.prop_map(|t| format!("<script>{t}</script>")),
        text.prop_map(|t| format!("<section><h2>{t}</h2><p>{t}, {t}</p></section>")),
        text.prop_map(|t| format!("<div class=\"sidebar\"><a href=\"#\">{t}</a></div>")),
        text.prop_map(|t| format!("<pre>{t}</pre>")),
    ]
}

fn document() -> impl Strategy<Value = String> {
    (proptest::option::of("[a-zA-Z ]{0,30}"), proptest::collection::vec(block(), 0..12)).prop_map(|(title, blocks)| {
        let head = title.map(|t| format!("<title>{t}</title>")).unwrap_or_default();
        format!("<html><head>{head}</head><body>{}</body></html>", blocks.concat())
    })
}

proptest! {
    #[test]
    fn test_extract_invariants(html in document()) {
        match extract(&html, URL) {
            Ok(extracted) => {
                let article = extracted.article();
                assert_collapsed(&article.text_content);
                prop_assert!(!article.text_content.is_empty());
                prop_assert!(article.excerpt.chars().count() <= 200);
                prop_assert!(!article.title.is_empty());
                prop_assert_eq!(article.length, article.text_content.chars().count());
                if extracted.is_fallback() {
                    prop_assert!(article.text_content.starts_with(&article.excerpt));
                }
            }
            Err(e) => prop_assert_eq!(e, ExtractError::NoExtractableContent),
        }
    }

    #[test]
    fn test_extract_idempotent(html in document()) {
        prop_assert_eq!(extract(&html, URL), extract(&html, URL));
    }

    #[test]
    fn test_extract_never_panics(html in ".*") {
        let _ = extract(&html, URL);
    }
}
