use serde::Deserialize;
use std::time::Duration;

/// Number of workers used when neither the config nor the CLI sets one
pub const DEFAULT_WORKERS: usize = 100;

/// Main configuration structure for Ripple-Crawl
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of concurrent fetch workers
    pub workers: usize,

    /// Capacity of the channel carrying results back to the coordinator
    ///
    /// Defaults to the worker count when unset.
    #[serde(rename = "result-buffer")]
    pub result_buffer: Option<usize>,

    /// Upper bound on a single page fetch (milliseconds)
    #[serde(rename = "fetch-timeout-ms")]
    pub fetch_timeout_ms: Option<u64>,

    /// Maximum number of pages to submit for fetching, seed included
    #[serde(rename = "max-pages")]
    pub max_pages: Option<usize>,

    /// Only follow links on the seed's host
    #[serde(rename = "same-host")]
    pub same_host: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            result_buffer: None,
            fetch_timeout_ms: None,
            max_pages: None,
            same_host: false,
        }
    }
}

impl CrawlerConfig {
    /// Result channel capacity actually used by the coordinator
    pub fn effective_result_buffer(&self) -> usize {
        self.result_buffer.unwrap_or(self.workers)
    }

    /// Per-fetch timeout as a duration
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "RippleCrawl".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/ripple-crawl".to_string(),
            contact_email: "crawler@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the markdown summary file, if one should be written
    #[serde(rename = "summary-path")]
    pub summary_path: Option<String>,
}
