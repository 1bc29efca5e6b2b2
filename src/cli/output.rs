//! CLI output formatting utilities.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print indexed source info.
    pub fn source_info(title: &str, id: &str, chunks: u32) {
        println!(
            "  {} {} ({}, {} chunks)",
            style("*").cyan(),
            style(title).bold(),
            style(id).dim(),
            chunks
        );
    }

    /// Print a search result.
    pub fn search_result(title: &str, location: Option<&str>, score: f32, content: &str) {
        let location_part = location.map(|l| format!(" @ {}", l)).unwrap_or_default();
        println!(
            "\n{} {}{} (score: {:.2})",
            style(">>").green(),
            style(title).bold(),
            style(&location_part).cyan(),
            score
        );
        println!("   {}", content_preview(content, 200));
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate content with ellipsis.
fn content_preview(content: &str, max_len: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_len {
        content
    } else {
        let truncated: String = content.chars().take(max_len).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_preview_truncates() {
        let long = "word ".repeat(100);
        let preview = content_preview(&long, 20);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 23);
    }

    #[test]
    fn test_content_preview_flattens_newlines() {
        assert_eq!(content_preview("a\nb", 10), "a b");
    }
}
