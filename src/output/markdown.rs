//! Markdown report generation
//!
//! This module renders a finished crawl as a human-readable markdown file:
//! run metadata, overall counts, failures by kind and a table of every page
//! that failed.

use crate::output::stats::{CrawlReport, PageOutcome};
use crate::FailureKind;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown report of the crawl to `output_path`
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(std::io::Error)` - Failed to create or write the file
pub fn generate_markdown_report(report: &CrawlReport, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_report(report: &CrawlReport) -> String {
    let summary = &report.summary;
    let mut md = String::new();

    md.push_str("# Ripple-Crawl Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", report.seed));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Finished**: {}\n",
        report.finished_at.to_rfc3339()
    ));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        report.duration().num_milliseconds() as f64 / 1000.0
    ));
    md.push_str(&format!("- **Outcome**: {}\n", report.phase));
    if report.cancelled {
        md.push_str("- **Cancelled**: yes\n");
    }
    if let Some(error) = &report.seed_error {
        md.push_str(&format!("- **Seed Failure**: {}\n", error));
    }
    md.push('\n');

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Visited**: {}\n", summary.visited));
    md.push_str(&format!("- **Discovered**: {}\n", summary.discovered));
    md.push_str(&format!("- **Failed**: {}\n", summary.failed));
    md.push_str(&format!("- **Skipped Links**: {}\n", summary.skipped));
    md.push_str(&format!("- **Cancelled Tasks**: {}\n", summary.cancelled));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        summary.success_rate()
    ));

    if !summary.failures_by_kind.is_empty() {
        md.push_str("## Failures by Kind\n\n");
        md.push_str("| Kind | Count |\n");
        md.push_str("|------|-------|\n");
        for (kind, count) in &summary.failures_by_kind {
            md.push_str(&format!("| {} | {} |\n", kind, count));
        }
        md.push('\n');
    }

    let failures: Vec<_> = report
        .records
        .iter()
        .filter_map(|record| match &record.outcome {
            PageOutcome::Failure(error) if error.kind() != FailureKind::Cancelled => {
                Some((&record.url, error))
            }
            _ => None,
        })
        .collect();

    if !failures.is_empty() {
        md.push_str("## Failed Pages\n\n");
        md.push_str("| URL | Error |\n");
        md.push_str("|-----|-------|\n");
        for (url, error) in failures {
            md.push_str(&format!(
                "| {} | {} |\n",
                escape_cell(url),
                escape_cell(&error.to_string())
            ));
        }
        md.push('\n');
    }

    md
}

/// Escapes pipe characters so a value stays inside its table cell
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}
