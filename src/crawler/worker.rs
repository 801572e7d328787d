//! Fixed-size worker pool
//!
//! Each worker repeatedly takes one task from the shared task queue, runs the
//! page fetcher on it and sends exactly one [`CrawlResult`] back. Workers keep
//! no state between tasks.
//!
//! The task receiver is shared behind an async mutex. A worker holds that lock
//! only while waiting for its next task; it is released before the fetch
//! starts, so a worker blocked on a full result channel never holds it.

use crate::crawler::{CrawlResult, PageFetcher, Task};
use crate::FetchError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinSet;

/// Shared receiving end of the task queue
pub(crate) type TaskQueue = Arc<Mutex<mpsc::UnboundedReceiver<Task>>>;

/// Everything a worker needs, cloned once per worker
#[derive(Clone)]
struct WorkerContext {
    fetcher: Arc<dyn PageFetcher>,
    tasks: TaskQueue,
    results: mpsc::Sender<CrawlResult>,
    cancelled: watch::Receiver<bool>,
    fetch_timeout: Option<Duration>,
}

/// Handle on a running pool of workers
pub(crate) struct WorkerPool {
    workers: JoinSet<()>,
}

impl WorkerPool {
    /// Spawns `size` workers on the current tokio runtime
    ///
    /// The workers exit when the task queue is closed and drained, or when
    /// the result channel's receiver is dropped.
    pub(crate) fn spawn(
        size: usize,
        fetcher: Arc<dyn PageFetcher>,
        tasks: mpsc::UnboundedReceiver<Task>,
        results: mpsc::Sender<CrawlResult>,
        cancelled: watch::Receiver<bool>,
        fetch_timeout: Option<Duration>,
    ) -> Self {
        let context = WorkerContext {
            fetcher,
            tasks: Arc::new(Mutex::new(tasks)),
            results,
            cancelled,
            fetch_timeout,
        };

        let mut workers = JoinSet::new();
        for id in 0..size {
            workers.spawn(run_worker(id, context.clone()));
        }

        tracing::debug!("Spawned {} workers", size);
        Self { workers }
    }

    /// Waits for every worker to exit
    pub(crate) async fn join(mut self) {
        while let Some(joined) = self.workers.join_next().await {
            if let Err(e) = joined {
                tracing::warn!("Worker terminated abnormally: {}", e);
            }
        }
    }
}

/// The worker loop: one task in, one result out
async fn run_worker(id: usize, context: WorkerContext) {
    loop {
        let task = {
            let mut tasks = context.tasks.lock().await;
            tasks.recv().await
        };

        let Some(task) = task else {
            tracing::trace!(worker = id, "Task queue closed, worker exiting");
            break;
        };

        let page = if *context.cancelled.borrow() {
            Err(FetchError::Cancelled)
        } else {
            tracing::debug!(worker = id, url = %task.url, "Fetching");
            fetch_isolated(&context, &task.url).await
        };

        let result = CrawlResult {
            url: task.url,
            page,
        };

        if context.results.send(result).await.is_err() {
            tracing::trace!(worker = id, "Result channel closed, worker exiting");
            break;
        }
    }
}

/// Runs one fetch in its own task
///
/// A panicking fetcher or an expired timeout still produces a result, so the
/// coordinator's outstanding count always reaches zero.
async fn fetch_isolated(
    context: &WorkerContext,
    url: &str,
) -> Result<crate::crawler::PageSummary, FetchError> {
    let fetcher = Arc::clone(&context.fetcher);
    let owned_url = url.to_string();
    let mut handle = tokio::spawn(async move { fetcher.fetch(&owned_url).await });

    let joined = match context.fetch_timeout {
        Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                handle.abort();
                tracing::debug!(url, "Fetch exceeded {:?}", limit);
                return Err(FetchError::Timeout);
            }
        },
        None => handle.await,
    };

    joined.unwrap_or_else(|e| Err(FetchError::Aborted(e.to_string())))
}
