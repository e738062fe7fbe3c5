//! Per-branch suite reports and their on-disk cache
//!
//! Reports are cached by `(branch, revision)` and trusted only while:
//!
//! - the file name carries the current source [`Fingerprint`], and
//! - the revision is still the branch's current revision on the remote.
//!
//! # Lifecycle
//!
//! | Step | Effect |
//! |------|--------|
//! | load | Decode matching files, then validate against the remote |
//! | get / get_or_create | Look up (or build) the working copy's report |
//! | get_remote_patterns | Map remote branches to cached reports or gaps |
//! | save | Prune stale files and rewrite every retained entry |

pub mod cache;
pub mod codec;
pub mod fingerprint;
pub mod tree;

pub use cache::{CacheFile, CacheKey, CacheOptions, Collaborators, ReportCache};
pub use fingerprint::Fingerprint;
pub use tree::{NodeKind, SpecReport, SuiteTree};
