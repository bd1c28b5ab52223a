//! Terminal progress and summary output.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::time::Duration;

use crate::harvest::HarvestSummary;
use crate::models::BookRecord;

/// Spinner showing the page and book currently being collected.
///
/// Hidden when quiet or when stderr is not a terminal, so piped runs only
/// get the log lines.
pub struct HarvestProgress {
    pb: ProgressBar,
}

impl HarvestProgress {
    pub fn new(quiet: bool) -> Self {
        if quiet || !std::io::stderr().is_terminal() {
            return Self::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{elapsed_precise}] {pos} saved {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        Self { pb }
    }

    /// A reporter that draws nothing
    pub fn hidden() -> Self {
        Self {
            pb: ProgressBar::hidden(),
        }
    }

    /// Called when a new listing page starts
    pub fn page(&self, number: usize) {
        self.pb.set_message(format!("| page {}", number));
    }

    /// Called after a row has been appended
    pub fn saved(&self, record: &BookRecord) {
        self.pb.inc(1);
        self.pb
            .set_message(format!("| #{} {}", record.id, truncate(&record.title, 48)));
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Print the end-of-run summary.
pub fn print_summary(summary: &HarvestSummary, csv_path: &std::path::Path) {
    println!(
        "{} {} {} {}",
        summary.written.to_string().bold().green(),
        "books written to".bold(),
        csv_path.display().to_string().blue().underline(),
        format!("({} pages)", summary.pages).dimmed()
    );

    if !summary.failures.is_empty() {
        println!(
            "{} {}",
            summary.failures.len().to_string().bold().yellow(),
            "books skipped:".bold().yellow()
        );
        for line in failure_lines(summary) {
            println!("  {} {}", "✗".red(), line);
        }
    }
}

/// Report skipped books on stderr. Used instead of the summary in quiet mode.
pub fn print_failures(summary: &HarvestSummary) {
    for line in failure_lines(summary) {
        eprintln!("skipped {}", line);
    }
}

/// One line per skipped book, in listing order
pub fn failure_lines(summary: &HarvestSummary) -> Vec<String> {
    summary.failures.iter().map(ToString::to_string).collect()
}
