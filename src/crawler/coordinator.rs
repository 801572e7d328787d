//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator is the single owner of the frontier and of the
//! outstanding-work count. It:
//! - Seeds the task queue
//! - Consumes results strictly in arrival order
//! - Deduplicates and admits newly discovered links
//! - Detects termination when every submitted task has been accounted for
//!
//! # Channels
//!
//! Tasks go out on an unbounded queue, so submitting never blocks the
//! coordinator. Results come back on a bounded channel sized by
//! `result_buffer`. Workers can wait on a full result channel, but the
//! coordinator only ever waits to receive, so the channel always drains and
//! dispatch and collection cannot deadlock each other.

use crate::config::{Config, CrawlerConfig, DEFAULT_WORKERS};
use crate::crawler::frontier::{Frontier, OutstandingWork};
use crate::crawler::worker::WorkerPool;
use crate::crawler::{CancelHandle, CrawlResult, HttpFetcher, PageFetcher, Task};
use crate::output::{CrawlReport, CrawlSummary, PageOutcome, PageRecord};
use crate::state::CrawlPhase;
use crate::url::{host_of, normalize_seed};
use crate::{ConfigError, CrawlError, FailureKind, FetchError};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// How often (in consumed results) progress is logged
const PROGRESS_INTERVAL: u64 = 100;

/// Run-time settings for one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSettings {
    /// Number of concurrent fetch workers
    pub workers: usize,

    /// Capacity of the result channel
    pub result_buffer: usize,

    /// Upper bound on a single fetch, enforced by the worker
    pub fetch_timeout: Option<Duration>,

    /// Maximum number of tasks ever submitted, seed included
    pub max_pages: Option<usize>,

    /// Only admit links on the seed's host
    pub same_host: bool,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            result_buffer: DEFAULT_WORKERS,
            fetch_timeout: None,
            max_pages: None,
            same_host: false,
        }
    }
}

impl CrawlSettings {
    /// Settings with `workers` workers and a result buffer of the same size
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            result_buffer: workers,
            ..Self::default()
        }
    }
}

impl From<&CrawlerConfig> for CrawlSettings {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            workers: config.workers,
            result_buffer: config.effective_result_buffer(),
            fetch_timeout: config.fetch_timeout(),
            max_pages: config.max_pages,
            same_host: config.same_host,
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    seed: String,
    seed_host: Option<String>,
    settings: CrawlSettings,
    fetcher: Arc<dyn PageFetcher>,
    frontier: Frontier,
    work: OutstandingWork,
    phase: CrawlPhase,
    summary: CrawlSummary,
    records: Vec<PageRecord>,
    seed_error: Option<FetchError>,
    cancel: CancelHandle,
    cancelled: bool,
}

impl Coordinator {
    /// Creates a coordinator for one crawl run
    ///
    /// # Arguments
    ///
    /// * `seed` - The identifier the crawl starts from
    /// * `settings` - Pool size, buffering and admission settings
    /// * `fetcher` - The page fetcher every worker calls
    pub fn new(
        seed: impl Into<String>,
        settings: CrawlSettings,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        let seed = seed.into();
        let seed_host = host_of(&seed);

        Self {
            seed,
            seed_host,
            settings,
            fetcher,
            frontier: Frontier::new(),
            work: OutstandingWork::new(),
            phase: CrawlPhase::Seeding,
            summary: CrawlSummary::default(),
            records: Vec::new(),
            seed_error: None,
            cancel: CancelHandle::new(),
            cancelled: false,
        }
    }

    /// Creates a coordinator that fetches over HTTP using the given config
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - The seed is not a URL or the HTTP client could
    ///   not be built
    ///
    /// The seed is normalized like every discovered link, so links back to it
    /// are recognised as already seen.
    pub fn from_config(seed: &str, config: &Config) -> Result<Self, CrawlError> {
        let seed = normalize_seed(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", seed, e)))?;
        let settings = CrawlSettings::from(&config.crawler);
        let fetcher = HttpFetcher::from_config(&config.user_agent, settings.fetch_timeout)?;
        Ok(Self::new(seed.to_string(), settings, Arc::new(fetcher)))
    }

    /// Returns a handle that cancels this crawl
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Current coordinator phase
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Runs the crawl to completion
    ///
    /// This method:
    /// 1. Spawns the worker pool
    /// 2. Seeds the task queue
    /// 3. Drains results until no work is outstanding or the seed fails
    /// 4. Closes the task queue and waits for the workers to exit
    ///
    /// A seed failure is not an `Err` here; the report carries
    /// [`CrawlPhase::DoneError`] and the seed's error. Use
    /// [`CrawlReport::into_result`] to turn it into one.
    pub async fn run(mut self) -> Result<CrawlReport, CrawlError> {
        let started_at = Utc::now();

        tracing::info!(
            "Starting crawl from {} with {} workers (result buffer {})",
            self.seed,
            self.settings.workers,
            self.settings.result_buffer
        );

        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let (result_tx, mut result_rx) = mpsc::channel(self.settings.result_buffer.max(1));

        let pool = WorkerPool::spawn(
            self.settings.workers.max(1),
            Arc::clone(&self.fetcher),
            task_rx,
            result_tx,
            self.cancel.subscribe(),
            self.settings.fetch_timeout,
        );

        let outcome = self.drive(&task_tx, &mut result_rx).await;

        // Closing both channels lets idle workers see an empty queue and busy
        // ones fail their final send
        drop(task_tx);
        drop(result_rx);
        pool.join().await;

        outcome?;

        let report = self.into_report(started_at);
        tracing::info!(
            "Crawl {}: {} visited, {} discovered, {} failed in {:?}",
            report.phase,
            report.summary.visited,
            report.summary.discovered,
            report.summary.failed,
            report.duration().to_std().unwrap_or_default()
        );

        Ok(report)
    }

    /// The Seeding and Draining phases
    async fn drive(
        &mut self,
        tasks: &mpsc::UnboundedSender<Task>,
        results: &mut mpsc::Receiver<CrawlResult>,
    ) -> Result<(), CrawlError> {
        let seed = self.seed.clone();
        self.frontier.mark_seen_if_new(&seed);
        self.submit(tasks, seed)?;
        self.transition(CrawlPhase::Draining)?;

        while let Some(result) = results.recv().await {
            self.work.consume(&result.url)?;
            self.process_result(result, tasks)?;

            if self.work.consumed() % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    "Progress: {} results consumed, {} outstanding, {} discovered",
                    self.work.consumed(),
                    self.work.outstanding(),
                    self.frontier.len()
                );
            }

            if self.phase.is_terminal() {
                return Ok(());
            }

            if self.work.is_settled() {
                self.transition(CrawlPhase::Done)?;
                return Ok(());
            }
        }

        Err(CrawlError::WorkersExited)
    }

    /// Records one result and admits its links
    fn process_result(
        &mut self,
        result: CrawlResult,
        tasks: &mpsc::UnboundedSender<Task>,
    ) -> Result<(), CrawlError> {
        self.summary.record_result(result.error());

        match result.page {
            Ok(page) => {
                tracing::info!(
                    url = %result.url,
                    outcome = "success",
                    links = page.links.len(),
                    title = page.title.as_deref().unwrap_or(""),
                    "Page processed"
                );

                for link in &page.links {
                    self.admit(link, tasks)?;
                }

                self.records.push(PageRecord {
                    url: result.url,
                    outcome: PageOutcome::Success,
                    title: page.title,
                    link_count: page.links.len(),
                });
            }
            Err(error) => {
                if error.kind() == FailureKind::Cancelled {
                    tracing::debug!(url = %result.url, "Task dropped after cancellation");
                } else {
                    tracing::warn!(
                        url = %result.url,
                        outcome = "failure",
                        links = 0,
                        error = %error,
                        "Page failed"
                    );
                }

                let seed_failed =
                    result.url == self.seed && error.kind() != FailureKind::Cancelled;

                self.records.push(PageRecord {
                    url: result.url,
                    outcome: PageOutcome::Failure(error.clone()),
                    title: None,
                    link_count: 0,
                });

                if seed_failed {
                    tracing::error!("Seed {} failed: {}", self.seed, error);
                    self.seed_error = Some(error);
                    self.transition(CrawlPhase::DoneError)?;
                }
            }
        }

        Ok(())
    }

    /// Applies the admission policy to one discovered link
    ///
    /// Links that are out of scope, over the page limit, or found after
    /// cancellation are counted as skipped and never marked seen. Links
    /// already in the frontier are ignored without counting.
    fn admit(&mut self, link: &str, tasks: &mpsc::UnboundedSender<Task>) -> Result<(), CrawlError> {
        if self.frontier.contains(link) {
            return Ok(());
        }

        if self.observe_cancellation() {
            self.summary.skipped += 1;
            return Ok(());
        }

        if self.settings.same_host && !self.in_scope(link) {
            tracing::trace!("Skipping off-host link {}", link);
            self.summary.skipped += 1;
            return Ok(());
        }

        if let Some(max_pages) = self.settings.max_pages {
            if self.work.submitted() >= max_pages as u64 {
                tracing::trace!("Page limit {} reached, skipping {}", max_pages, link);
                self.summary.skipped += 1;
                return Ok(());
            }
        }

        if self.frontier.mark_seen_if_new(link) {
            tracing::debug!("Adding {} to the queue", link);
            self.submit(tasks, link.to_string())?;
        }

        Ok(())
    }

    /// Hands one task to the worker pool and counts it as outstanding
    fn submit(
        &mut self,
        tasks: &mpsc::UnboundedSender<Task>,
        url: String,
    ) -> Result<(), CrawlError> {
        tasks
            .send(Task::new(url))
            .map_err(|_| CrawlError::WorkersExited)?;
        self.work.submit();
        Ok(())
    }

    /// Returns whether the crawl is cancelled, logging the first observation
    fn observe_cancellation(&mut self) -> bool {
        if !self.cancelled && self.cancel.is_cancelled() {
            self.cancelled = true;
            tracing::info!(
                "Cancellation requested, admitting no new tasks ({} outstanding)",
                self.work.outstanding()
            );
        }
        self.cancelled
    }

    /// Whether a link is on the seed's host
    fn in_scope(&self, link: &str) -> bool {
        match (&self.seed_host, host_of(link)) {
            (Some(seed_host), Some(host)) => *seed_host == host,
            _ => false,
        }
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), CrawlError> {
        if !self.phase.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!("Coordinator phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    fn into_report(mut self, started_at: chrono::DateTime<Utc>) -> CrawlReport {
        let cancelled = self.observe_cancellation() || self.summary.cancelled > 0;
        self.summary.discovered = self.frontier.len() as u64;

        CrawlReport {
            seed: self.seed,
            phase: self.phase,
            seed_error: self.seed_error,
            cancelled,
            summary: self.summary,
            records: self.records,
            tasks_submitted: self.work.submitted(),
            results_consumed: self.work.consumed(),
            started_at,
            finished_at: Utc::now(),
        }
    }
}
