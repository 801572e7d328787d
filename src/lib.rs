//! Ripple-Crawl: a bounded-concurrency web crawler
//!
//! This crate explores the link graph reachable from a single seed URL using a
//! fixed pool of workers, fetching every discovered page exactly once and
//! detecting completion without a shared job counter.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Ripple-Crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Seed {url} could not be fetched: {source}")]
    SeedFailed { url: String, source: FetchError },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("Received a result for {url} with no outstanding work")]
    UnexpectedResult { url: String },

    #[error("All workers exited while work was still outstanding")]
    WorkersExited,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Why a single page could not be turned into a page summary
///
/// Fetch errors never abort a crawl on their own. They travel back to the
/// coordinator inside a [`crawler::CrawlResult`] and are recorded there.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("fetch aborted: {0}")]
    Aborted(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("expected HTML, got '{0}'")]
    ContentType(String),

    #[error("malformed content: {0}")]
    Malformed(String),

    #[error("crawl cancelled before fetch")]
    Cancelled,
}

/// Coarse classification of fetch failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    /// The request could not be performed at all
    Transport,
    /// The server answered, but not with a usable HTML page
    Protocol,
    /// The body could not be read or decoded
    MalformedContent,
    /// The task was resolved without fetching because the crawl was cancelled
    Cancelled,
}

impl FetchError {
    /// Returns the failure class of this error
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidUrl(_)
            | Self::Connect(_)
            | Self::Timeout
            | Self::Transport(_)
            | Self::Aborted(_) => FailureKind::Transport,
            Self::Status(_) | Self::ContentType(_) => FailureKind::Protocol,
            Self::Malformed(_) => FailureKind::MalformedContent,
            Self::Cancelled => FailureKind::Cancelled,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Transport => "transport",
            Self::Protocol => "protocol",
            Self::MalformedContent => "malformed_content",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

/// Result type alias for Ripple-Crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CancelHandle, Coordinator, CrawlReport, HttpFetcher, PageFetcher, PageSummary};
pub use state::CrawlPhase;
