//! Crawler module: the scheduling engine and its HTTP collaborator
//!
//! This module contains the core crawling logic, including:
//! - The coordinator that owns the frontier and detects completion
//! - The fixed-size worker pool
//! - The `PageFetcher` contract and its HTTP implementation
//! - HTML parsing and link extraction

mod cancel;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod types;
mod worker;

pub use cancel::CancelHandle;
pub use coordinator::{Coordinator, CrawlSettings};
pub use fetcher::{build_http_client, HttpFetcher};
pub use frontier::{Frontier, OutstandingWork};
pub use parser::parse_html;
pub use types::{CrawlResult, PageFetcher, PageSummary, Task};

pub use crate::output::CrawlReport;

use crate::config::Config;
use crate::CrawlError;

/// Runs a complete crawl over HTTP
///
/// This is the simplest entry point: it builds the HTTP fetcher from the
/// configuration, crawls from `seed` until the frontier is exhausted, and
/// escalates a seed failure to [`CrawlError::SeedFailed`].
///
/// # Example
///
/// ```no_run
/// use ripple_crawl::config::Config;
/// use ripple_crawl::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = crawl("https://example.com/", &Config::default()).await?;
/// println!("visited {} pages", report.summary.visited);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(seed: &str, config: &Config) -> Result<CrawlReport, CrawlError> {
    Coordinator::from_config(seed, config)?
        .run()
        .await?
        .into_result()
}
