use std::time::Duration;

use mindvault_core::Extracted;
use owo_colors::OwoColorize;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "MindVault".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Extract readable article text from saved pages\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

/// Print timing information with color coding
pub fn print_timing(label: &str, duration: Duration) {
    let ms = duration.as_secs_f64() * 1000.0;
    let label = format!("{}:", label);

    if ms < 50.0 {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "fast".dimmed());
    } else if ms < 100.0 {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "moderate".bright_yellow());
    } else {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "slow".bright_red());
    }
}

/// Print a summary of the extracted article
pub fn print_extraction_details(extracted: &Extracted) {
    let article = extracted.article();

    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Extraction Details".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    eprintln!("  {} {}", "Title:".dimmed(), article.title.bright_white());
    eprintln!("  {} {}", "Path:".dimmed(), extracted.path().to_string().bright_white());
    eprintln!("  {} {}", "Length:".dimmed(), format!("{} chars", article.length).bright_white());

    if let Some(byline) = &article.metadata.byline {
        eprintln!("  {} {}", "Byline:".dimmed(), byline.bright_white());
    }
    if let Some(site_name) = &article.metadata.site_name {
        eprintln!("  {} {}", "Site:".dimmed(), site_name.bright_white());
    }
    if let Some(published) = &article.metadata.published_time {
        eprintln!("  {} {}", "Published:".dimmed(), published.bright_white());
    }
    eprintln!();
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
