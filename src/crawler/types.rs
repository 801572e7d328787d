//! Task and result types shared by the coordinator and the worker pool,
//! plus the [`PageFetcher`] contract workers call.

use crate::FetchError;
use async_trait::async_trait;

/// A single identifier queued for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// The URL to fetch
    pub url: String,
}

impl Task {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// What a successful fetch learned about a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSummary {
    /// Page title, if the page had a non-empty one
    pub title: Option<String>,

    /// Outbound links in document order (absolute URLs)
    pub links: Vec<String>,
}

/// The outcome of one dispatched task
///
/// Workers emit exactly one of these per task they take off the queue.
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// The identifier that was fetched
    pub url: String,

    /// The page summary, or why there is none
    pub page: Result<PageSummary, FetchError>,
}

impl CrawlResult {
    pub fn success(url: impl Into<String>, page: PageSummary) -> Self {
        Self {
            url: url.into(),
            page: Ok(page),
        }
    }

    pub fn failure(url: impl Into<String>, error: FetchError) -> Self {
        Self {
            url: url.into(),
            page: Err(error),
        }
    }

    /// Returns the failure, if any
    pub fn error(&self) -> Option<&FetchError> {
        self.page.as_ref().err()
    }
}

/// Turns an identifier into a page summary
///
/// Implementations must not retry and must report every transport, protocol
/// or content problem as a [`FetchError`] instead of panicking. They are
/// called concurrently from many workers, so any state they hold must be
/// shareable (`Send + Sync`) and must not be mutated between calls.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and extracts its title and outbound links
    async fn fetch(&self, url: &str) -> Result<PageSummary, FetchError>;
}
