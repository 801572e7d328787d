//! URL handling module for Ripple-Crawl
//!
//! The coordinator treats identifiers as opaque strings. Everything that
//! actually interprets a URL lives here: normalising links produced by the
//! HTML parser, and host extraction for the same-host admission policy.

mod domain;
mod normalize;

pub use domain::{extract_domain, host_of};
pub use normalize::{normalize_link, normalize_seed};
