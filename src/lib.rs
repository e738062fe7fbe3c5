//! Suitemap - test suite maps per branch
//!
//! Builds trees of test suites with aggregated spec counts from a dry run
//! of the suite, and caches one compressed report per branch and revision.
//! Cached reports are dropped as soon as their branch moves on the remote.

pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod process;
pub mod report;
pub mod ui;
pub mod vcs;

pub use error::{SuitemapError, SuitemapResult};
