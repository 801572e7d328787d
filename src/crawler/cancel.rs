//! Crawl cancellation
//!
//! A `CancelHandle` wraps the sending half of a `watch` channel. The
//! coordinator polls it before admitting links and each worker holds a
//! receiver to answer queued tasks without fetching.

use std::sync::Arc;
use tokio::sync::watch;

/// Requests cancellation of a running crawl
///
/// Cloneable and cheap; every clone controls the same crawl. Cancelling is
/// idempotent.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
        }
    }

    /// Stops the crawl from admitting new work
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Returns whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}
