//! Output module for crawl summaries and reports
//!
//! This module handles:
//! - Accumulating per-page records and summary counts during a run
//! - Printing the final summary to the console
//! - Writing a markdown report

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_report, generate_markdown_report};
pub use stats::{print_summary, CrawlReport, CrawlSummary, PageOutcome, PageRecord};
