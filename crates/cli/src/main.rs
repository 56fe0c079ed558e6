use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::Parser;
use mindvault_core::{ExtractError, Extractor, ExtractorConfig, OutputFormat as ArticleFormat};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use url::Url;

mod echo;

use echo::{
    format_size, print_banner, print_error, print_extraction_details, print_info, print_step, print_success,
    print_timing, print_warning,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for extracted content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Html,
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: html, text, json", s)),
        }
    }
}

/// Extract the readable article from a saved HTML page
#[derive(Parser, Debug)]
#[command(name = "mindvault")]
#[command(version)]
#[command(about = "Extract readable article text from saved pages", long_about = None)]
struct Args {
    /// Local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Address the page was fetched from (default: the file's path)
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (html, text, json)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    format: OutputFormat,

    /// Top candidate score below which the whole body is used
    #[arg(long, default_value = "20", value_name = "SCORE")]
    min_score: f64,

    /// Maximum number of top candidates to track
    #[arg(long, default_value = "5", value_name = "NUM")]
    max_elements: usize,

    /// Strip images from output
    #[arg(long)]
    no_images: bool,

    /// Keep class attributes in output HTML
    #[arg(long)]
    keep_classes: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { EnvFilter::new("mindvault_core=debug") } else { EnvFilter::from_default_env() };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

/// Base URL for a local file: the `--url` flag, else its absolute `file://` path
fn resolve_source_url(input: &str, url: Option<String>) -> anyhow::Result<String> {
    if let Some(url) = url {
        return Ok(url);
    }
    if input == "-" {
        bail!("--url is required when reading from stdin");
    }

    let path = fs::canonicalize(Path::new(input)).with_context(|| format!("Failed to resolve path: {}", input))?;
    Url::from_file_path(&path)
        .map(String::from)
        .map_err(|_| anyhow::anyhow!("Cannot build a file URL for {}", path.display()))
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read file: {}", input))
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
        let source = if args.input == "-" { "stdin".to_string() } else { format!("file {}", args.input) };
        print_step(1, 3, &format!("Reading from {}", source.bright_white()));
    }

    let html = read_input(&args.input)?;
    let source_url = resolve_source_url(&args.input, args.url)?;
    tracing::debug!(bytes = html.len(), url = %source_url, "input loaded");

    if args.verbose {
        eprintln!("  {} {}", "Size:".dimmed(), format_size(html.len()).bright_white());
        eprintln!("  {} {}", "URL:".dimmed(), source_url.bright_white().underline());
        eprintln!();
        print_step(2, 3, "Extracting main content");
    }

    let config = ExtractorConfig::builder()
        .min_score(args.min_score)
        .nb_top_candidates(args.max_elements)
        .preserve_images(!args.no_images)
        .keep_classes(args.keep_classes)
        .build();

    let started = Instant::now();
    let extracted = match Extractor::with_config(config).extract(&html, &source_url) {
        Ok(extracted) => extracted,
        Err(e) if e.is_unreadable() => {
            print_error(&format!("Could not read this page: {}", e));
            return Ok(ExitCode::from(2));
        }
        Err(ExtractError::InvalidUrl(url)) => bail!("Invalid source URL: {}", url),
        Err(e) => return Err(e.into()),
    };

    if args.verbose {
        print_timing("Extraction", started.elapsed());
        print_extraction_details(&extracted);
        if extracted.is_fallback() {
            print_warning("No article boundary found, used the whole page body");
        }
        print_step(3, 3, "Writing output");
        eprintln!("  {} {}", "Format:".dimmed(), format!("{:?}", args.format).bright_white());
        eprintln!();
    }

    let output = match args.format {
        OutputFormat::Html => extracted.article().to_format(ArticleFormat::Html)?,
        OutputFormat::Text => extracted.article().to_format(ArticleFormat::PlainText)?,
        OutputFormat::Json => serde_json::to_string_pretty(&extracted).context("Failed to serialize article")?,
    };

    match args.output {
        Some(path) => {
            fs::write(&path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => println!("{}", output),
    }

    Ok(ExitCode::SUCCESS)
}
