//! Crawl statistics and per-page records
//!
//! This module provides the data the coordinator accumulates while it
//! drains results, and the console rendering of the final summary.

use crate::{CrawlError, CrawlPhase, FailureKind, FetchError};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Outcome of a single processed identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page was fetched and parsed
    Success,
    /// The page could not be fetched
    Failure(FetchError),
}

impl PageOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Short name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure(_) => "failure",
        }
    }
}

/// One processed identifier, in the order the coordinator consumed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub url: String,
    pub outcome: PageOutcome,
    pub title: Option<String>,
    /// Number of outbound links the page reported (before deduplication)
    pub link_count: usize,
}

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Results consumed for tasks that were actually fetched
    pub visited: u64,

    /// Distinct identifiers admitted to the frontier, seed included
    pub discovered: u64,

    /// Fetch attempts that failed
    pub failed: u64,

    /// Links not admitted because of scope, page limit or cancellation
    pub skipped: u64,

    /// Tasks resolved without a fetch because the crawl was cancelled
    pub cancelled: u64,

    /// Failed fetch attempts by failure class
    pub failures_by_kind: BTreeMap<FailureKind, u64>,
}

impl CrawlSummary {
    /// Records one consumed result
    pub(crate) fn record_result(&mut self, error: Option<&FetchError>) {
        match error.map(FetchError::kind) {
            None => self.visited += 1,
            Some(FailureKind::Cancelled) => self.cancelled += 1,
            Some(kind) => {
                self.visited += 1;
                self.failed += 1;
                *self.failures_by_kind.entry(kind).or_insert(0) += 1;
            }
        }
    }

    /// Percentage of visited pages that were fetched successfully
    pub fn success_rate(&self) -> f64 {
        if self.visited == 0 {
            return 0.0;
        }
        (self.visited - self.failed) as f64 / self.visited as f64 * 100.0
    }
}

/// Everything a finished crawl run reports
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// The seed identifier the run started from
    pub seed: String,

    /// Terminal phase: `Done` or `DoneError`
    pub phase: CrawlPhase,

    /// Why the seed failed, when `phase` is `DoneError`
    pub seed_error: Option<FetchError>,

    /// Whether the run was cancelled before the frontier was exhausted
    pub cancelled: bool,

    pub summary: CrawlSummary,

    /// Processed identifiers in consumption order
    pub records: Vec<PageRecord>,

    /// Tasks handed to the worker pool, seed included
    pub tasks_submitted: u64,

    /// Results taken off the result channel
    pub results_consumed: u64,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    /// Wall-clock duration of the run
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Tasks submitted whose result was never consumed
    pub fn outstanding(&self) -> u64 {
        self.tasks_submitted - self.results_consumed
    }

    /// Converts a seed failure into an error, keeping successful reports
    pub fn into_result(self) -> Result<Self, CrawlError> {
        match (self.phase, &self.seed_error) {
            (CrawlPhase::DoneError, Some(error)) => Err(CrawlError::SeedFailed {
                url: self.seed.clone(),
                source: error.clone(),
            }),
            _ => Ok(self),
        }
    }
}

/// Prints the summary to stdout in a formatted manner
pub fn print_summary(report: &CrawlReport) {
    let summary = &report.summary;

    println!("=== Crawl Summary ===\n");

    println!("Run:");
    println!("  Seed: {}", report.seed);
    println!("  Outcome: {}", report.phase);
    if report.cancelled {
        println!("  Cancelled: yes");
    }
    println!(
        "  Duration: {:.2}s",
        report.duration().num_milliseconds() as f64 / 1000.0
    );
    println!();

    println!("Overview:");
    println!("  Visited: {}", summary.visited);
    println!("  Discovered: {}", summary.discovered);
    println!("  Failed: {}", summary.failed);
    if summary.skipped > 0 {
        println!("  Skipped links: {}", summary.skipped);
    }
    if summary.cancelled > 0 {
        println!("  Cancelled tasks: {}", summary.cancelled);
    }
    println!();

    if !summary.failures_by_kind.is_empty() {
        println!("Failures by Kind:");
        for (kind, count) in &summary.failures_by_kind {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    if let Some(error) = &report.seed_error {
        println!("Seed failure: {}", error);
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched successfully)",
        summary.success_rate(),
        summary.visited - summary.failed,
        summary.visited
    );
}
