//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

const URL: &str = "https://example.com/posts/ownership";

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("mindvault")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

#[test]
fn test_cli_file_input() {
    cmd()
        .arg(get_fixture_path("article.html"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Understanding Ownership in Rust"));
}

#[test]
fn test_cli_stdin_input() {
    let html = std::fs::read_to_string(get_fixture_path("article.html")).unwrap();
    cmd()
        .args(["--url", URL, "-"])
        .write_stdin(html)
        .assert()
        .success()
        .stdout(predicate::str::contains("Borrowing lets code use a value"));
}

#[test]
fn test_cli_stdin_requires_url() {
    cmd()
        .arg("-")
        .write_stdin("<html><body><p>text</p></body></html>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--url"));
}

#[test]
fn test_cli_html_format() {
    cmd()
        .args(["-f", "html", "--url", URL, &get_fixture_path("article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("<h1"))
        .stdout(predicate::str::contains("https://example.com/images/borrows.png"));
}

#[test]
fn test_cli_json_format() {
    let output = cmd()
        .args(["-f", "json", "--url", URL, &get_fixture_path("article.html")])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["path"], "structured");
    assert_eq!(json["article"]["metadata"]["byline"], "Sam Rivera");
}

#[test]
fn test_cli_fallback_path_json() {
    let output = cmd()
        .args(["-f", "json", &get_fixture_path("scripts_only.html")])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["path"], "fallback");
    assert_eq!(json["article"]["title"], "Loading");
}

#[test]
fn test_cli_output_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("output.txt");

    cmd()
        .args(["-o", output.to_str().unwrap()])
        .arg(get_fixture_path("article.html"))
        .assert()
        .success();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("Lifetimes describe how long references are valid."));
}

#[test]
fn test_cli_invalid_file() {
    cmd().arg("nonexistent.html").assert().failure();
}

#[test]
fn test_cli_empty_content() {
    cmd()
        .arg(get_fixture_path("empty_content.html"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Could not read this page"));
}

#[test]
fn test_cli_invalid_url() {
    cmd()
        .args(["--url", "not a url", &get_fixture_path("article.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid source URL"));
}

#[test]
fn test_cli_malformed_html() {
    cmd()
        .arg(get_fixture_path("malformed.html"))
        .assert()
        .success()
        .stdout(predicate::str::contains("cell text"));
}

#[test]
fn test_cli_unicode_content() {
    cmd()
        .arg(get_fixture_path("unicode.html"))
        .assert()
        .success()
        .stdout(predicate::str::contains("神保町"));
}

#[test]
fn test_cli_verbose() {
    cmd()
        .args(["-v", &get_fixture_path("article.html")])
        .assert()
        .success()
        .stderr(predicate::str::contains("MindVault"))
        .stderr(predicate::str::contains("Extraction Details"));
}

#[test]
fn test_cli_no_images() {
    cmd()
        .args(["--no-images", "-f", "html", &get_fixture_path("article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("<img").not());
}

#[test]
fn test_cli_keep_classes() {
    cmd()
        .args(["--keep-classes", "-f", "html", &get_fixture_path("article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("class="));
}

#[test]
fn test_cli_min_score() {
    cmd()
        .args(["--min-score", "1000", &get_fixture_path("article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ownership is the feature"));
}

#[test]
fn test_cli_invalid_format() {
    cmd()
        .args(["-f", "markdown", &get_fixture_path("article.html")])
        .assert()
        .failure();
}
