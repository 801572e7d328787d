//! Frontier bookkeeping owned by the coordinator
//!
//! Neither type here is shared with workers. The coordinator's control loop is
//! the only writer, so a plain `HashSet` and two integers are enough.

use crate::CrawlError;
use std::collections::HashSet;

/// The set of identifiers ever admitted to the crawl
#[derive(Debug, Default)]
pub struct Frontier {
    seen: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an identifier as seen
    ///
    /// Returns true the first time an identifier is presented and false on
    /// every later presentation.
    pub fn mark_seen_if_new(&mut self, url: &str) -> bool {
        if self.seen.contains(url) {
            return false;
        }
        self.seen.insert(url.to_string())
    }

    /// Returns whether an identifier has been admitted
    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    /// Number of distinct identifiers admitted so far
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Tasks submitted minus results consumed
///
/// Both sides are counted separately so the invariant
/// `outstanding == submitted - consumed` holds by construction and a
/// consume with nothing outstanding is caught instead of wrapping.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OutstandingWork {
    submitted: u64,
    consumed: u64,
}

impl OutstandingWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one task handed to the worker pool
    pub fn submit(&mut self) {
        self.submitted += 1;
    }

    /// Records one result taken off the result channel
    ///
    /// Returns the outstanding count after the step.
    pub fn consume(&mut self, url: &str) -> Result<u64, CrawlError> {
        if self.outstanding() == 0 {
            return Err(CrawlError::UnexpectedResult {
                url: url.to_string(),
            });
        }
        self.consumed += 1;
        Ok(self.outstanding())
    }

    /// Tasks whose result has not been consumed yet
    pub fn outstanding(&self) -> u64 {
        self.submitted - self.consumed
    }

    pub fn submitted(&self) -> u64 {
        self.submitted
    }

    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// True once every submitted task has produced a consumed result
    pub fn is_settled(&self) -> bool {
        self.outstanding() == 0
    }
}
