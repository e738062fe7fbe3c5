//! Source fingerprint gating cache-format trust
//!
//! The fingerprint is a SHA256 digest over the report module's own source
//! files. Any change to the code that reads or writes cache entries changes
//! the fingerprint, so entries written by another build are never decoded.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// This module's source files, embedded at compile time in file-name order
const EMBEDDED_SOURCES: [&[u8]; 5] = [
    include_bytes!("cache.rs"),
    include_bytes!("codec.rs"),
    include_bytes!("fingerprint.rs"),
    include_bytes!("mod.rs"),
    include_bytes!("tree.rs"),
];

/// Opaque cache compatibility token
///
/// Either a hex digest or the empty sentinel, which disables caching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// The "unknown/untrusted" sentinel
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Wrap an existing digest, e.g. one parsed from a cache file name
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Fingerprint of the report sources this binary was built from
    ///
    /// Independent of where the binary runs; the source tree need not exist.
    pub fn current() -> Self {
        Self::from_sources(EMBEDDED_SOURCES)
    }

    /// Hash every regular file in `dir`, in file-name order
    ///
    /// Returns the empty sentinel when the directory or any file cannot be
    /// read. Subdirectories are not descended into.
    pub fn from_dir(dir: &Path) -> Self {
        match hash_dir(dir) {
            Ok(fingerprint) => {
                debug!("Source fingerprint {} from {}", fingerprint, dir.display());
                fingerprint
            }
            Err(e) => {
                info!(
                    "Source fingerprint unavailable ({}: {}), caching disabled",
                    dir.display(),
                    e
                );
                Self::empty()
            }
        }
    }

    /// Hash the concatenation of `sources` in the order given
    pub fn from_sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut hasher = Sha256::new();
        for source in sources {
            hasher.update(source.as_ref());
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// Whether this is the "disable caching" sentinel
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn hash_dir(dir: &Path) -> std::io::Result<Fingerprint> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    // Listing order is platform dependent
    paths.sort();

    let contents = paths
        .iter()
        .map(fs::read)
        .collect::<std::io::Result<Vec<_>>>()?;
    Ok(Fingerprint::from_sources(contents))
}
