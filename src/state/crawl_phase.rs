/// Coordinator phase definitions for tracking crawl progress
///
/// A crawl run moves through these phases exactly once, in order.
use std::fmt;

/// Represents the current phase of the crawl coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    // ===== Active Phases =====
    /// The seed is being marked seen and submitted
    Seeding,

    /// Results are being consumed until no work is outstanding
    Draining,

    // ===== Terminal Phases =====
    /// Every submitted task has been accounted for
    Done,

    /// The seed itself could not be fetched
    DoneError,
}

impl CrawlPhase {
    /// Returns true if the coordinator has stopped receiving results
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::DoneError)
    }

    /// Returns true if moving from `self` to `next` is a legal step
    ///
    /// Seeding → Draining → Done | DoneError. Terminal phases have no exits.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Seeding, Self::Draining)
                | (Self::Draining, Self::Done)
                | (Self::Draining, Self::DoneError)
        )
    }

    /// Short lowercase name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seeding => "seeding",
            Self::Draining => "draining",
            Self::Done => "done",
            Self::DoneError => "done_error",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
