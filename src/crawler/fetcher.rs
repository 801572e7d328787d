//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests to fetch page content
//! - Status and Content-Type checks
//! - Error classification into [`FetchError`]
//!
//! There is no retry logic here. A failed page is reported once and the
//! coordinator decides what that means for the crawl.

use crate::config::UserAgentConfig;
use crate::crawler::parser::parse_html;
use crate::crawler::{PageFetcher, PageSummary};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Maximum number of redirects followed for a single page
const MAX_REDIRECTS: usize = 10;

/// Request timeout used when the configuration does not set one
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Content type prefix a page must carry for its links to be extracted
const CONTENT_TYPE_HTML: &str = "text/html";

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Whole-request timeout; defaults to 30 seconds
///
/// # Example
///
/// ```no_run
/// use ripple_crawl::config::UserAgentConfig;
/// use ripple_crawl::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), None).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Option<Duration>,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageFetcher`] backed by a shared `reqwest` client
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher from an already configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a fetcher with a client built from the user agent config
    pub fn from_config(
        config: &UserAgentConfig,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config, timeout)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    /// Fetches a URL and extracts its title and links
    ///
    /// # Request Flow
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Unparseable URL | `InvalidUrl` |
    /// | Timeout | `Timeout` |
    /// | Connection refused / DNS / TLS | `Connect` |
    /// | Non-2xx status | `Status` |
    /// | Content-Type not `text/html` | `ContentType` |
    /// | Body cannot be read | `Malformed` |
    /// | Otherwise | parsed page, links resolved against the final URL |
    async fn fetch(&self, url: &str) -> Result<PageSummary, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type
            .trim_start()
            .to_ascii_lowercase()
            .starts_with(CONTENT_TYPE_HTML)
        {
            return Err(FetchError::ContentType(content_type));
        }

        // Relative links resolve against where the redirects ended up
        let final_url = response.url().clone();

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Malformed(e.to_string())
            }
        })?;

        Ok(parse_html(&body, &final_url))
    }
}

/// Maps a failed send into the fetch error taxonomy
fn classify_transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::Connect(e.to_string())
    } else if e.is_builder() {
        FetchError::InvalidUrl(e.to_string())
    } else {
        FetchError::Transport(e.to_string())
    }
}
