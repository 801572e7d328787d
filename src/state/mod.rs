//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: The coordinator's lifecycle (seeding, draining, done, done with error)

mod crawl_phase;

pub use crawl_phase::CrawlPhase;
