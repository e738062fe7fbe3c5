//! Report cache keyed by branch and revision
//!
//! The in-memory map is the source of truth for a run; the cache directory
//! is brought in line with it by [`ReportCache::save`].

use crate::builder::SuiteBuilder;
use crate::error::{SuitemapError, SuitemapResult};
use crate::report::codec;
use crate::report::fingerprint::Fingerprint;
use crate::report::tree::SuiteTree;
use crate::vcs::{RemoteResolver, WorkingCopyInspector};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Subdirectory of the per-user cache root
pub const CACHE_SUBDIR: &str = "suitemap";

/// Branch name git reports for a detached checkout
const DETACHED_HEAD: &str = "HEAD";

/// Identity of one cached report
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub branch: String,
    pub revision: String,
}

impl CacheKey {
    pub fn new(branch: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            revision: revision.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.branch, self.revision)
    }
}

/// Where the cache lives and what it trusts
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Cache directory
    pub dir: PathBuf,
    /// Remote whose branches validate cached entries
    pub remote: String,
    /// Current source fingerprint; empty disables caching
    pub fingerprint: Fingerprint,
}

impl CacheOptions {
    /// Per-user cache directory
    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CACHE_SUBDIR)
    }
}

/// External steps the cache depends on
pub struct Collaborators {
    pub resolver: Box<dyn RemoteResolver>,
    pub inspector: Box<dyn WorkingCopyInspector>,
    pub builder: Box<dyn SuiteBuilder>,
}

/// A cache file found on disk
#[derive(Debug, Clone)]
pub struct CacheFile {
    pub path: PathBuf,
    pub key: CacheKey,
    pub fingerprint: Fingerprint,
    pub size_bytes: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Branch/revision-keyed suite report cache
///
/// Not synchronized; wrap in a mutex to share between tasks.
pub struct ReportCache {
    dir: PathBuf,
    remote: String,
    fingerprint: Fingerprint,
    entries: BTreeMap<CacheKey, SuiteTree>,
    collaborators: Collaborators,
    cancel: CancellationToken,
}

impl ReportCache {
    /// Load the cache directory and drop entries the remote has moved past
    ///
    /// With an empty fingerprint the directory is not read at all.
    pub async fn load(
        options: CacheOptions,
        collaborators: Collaborators,
        cancel: CancellationToken,
    ) -> SuitemapResult<Self> {
        let mut cache = Self {
            dir: options.dir,
            remote: options.remote,
            fingerprint: options.fingerprint,
            entries: BTreeMap::new(),
            collaborators,
            cancel,
        };

        if cache.fingerprint.is_empty() {
            info!("No source fingerprint, report caching disabled");
            return Ok(cache);
        }

        cache.read_entries().await?;
        cache.update().await?;
        Ok(cache)
    }

    async fn read_entries(&mut self) -> SuitemapResult<()> {
        for (path, parsed) in list_files(&self.dir).await? {
            let Some((key, fingerprint)) = parsed else {
                debug!("Ignoring foreign file {}", path.display());
                continue;
            };
            if fingerprint != self.fingerprint {
                debug!("Skipping {} from another build", path.display());
                continue;
            }

            let bytes = fs::read(&path)
                .await
                .map_err(|e| SuitemapError::io(format!("reading cache file {}", path.display()), e))?;
            let tree = codec::decode(bytes.as_slice()).map_err(|e| SuitemapError::CacheDecode {
                path: path.clone(),
                source: e,
            })?;

            debug!("Loaded cached report {}", key);
            self.entries.insert(key, tree);
        }

        debug!("Loaded {} cached report(s)", self.entries.len());
        Ok(())
    }

    /// Evict every entry whose revision is not its branch's current remote revision
    ///
    /// All cached branches are resolved in one call. A resolver failure
    /// aborts the pass without evicting anything.
    pub async fn update(&mut self) -> SuitemapResult<()> {
        if self.entries.is_empty() {
            return Ok(());
        }

        let branches: BTreeSet<&str> = self.entries.keys().map(|k| k.branch.as_str()).collect();
        let patterns: Vec<String> = branches.into_iter().map(str::to_string).collect();
        let current = self
            .collaborators
            .resolver
            .resolve(&self.remote, &patterns, &self.cancel)
            .await?;

        self.entries.retain(|key, _| {
            let keep = current.get(&key.branch) == Some(&key.revision);
            if !keep {
                debug!(
                    "Evicting {} (remote: {})",
                    key,
                    current.get(&key.branch).map_or("gone", String::as_str)
                );
            }
            keep
        });

        Ok(())
    }

    /// Cache key for the working copy at `repo`
    ///
    /// `None` when caching is disabled, the working copy has local changes,
    /// or it is not on a branch.
    pub async fn resolve_key(&self, repo: &Path) -> SuitemapResult<Option<CacheKey>> {
        if self.fingerprint.is_empty() {
            return Ok(None);
        }

        let state = self
            .collaborators
            .inspector
            .inspect(repo, &self.cancel)
            .await?;
        if state.dirty {
            debug!("{} has local changes, not cacheable", repo.display());
            return Ok(None);
        }
        if state.branch == DETACHED_HEAD {
            debug!("{} is not on a branch, not cacheable", repo.display());
            return Ok(None);
        }

        Ok(Some(CacheKey::new(state.branch, state.revision)))
    }

    /// Cached report for the working copy at `repo`
    ///
    /// Fails with [`SuitemapError::CacheMiss`] when there is none.
    pub async fn get(&self, repo: &Path) -> SuitemapResult<&SuiteTree> {
        let key = self
            .resolve_key(repo)
            .await?
            .ok_or(SuitemapError::CacheMiss)?;
        self.entries.get(&key).ok_or(SuitemapError::CacheMiss)
    }

    /// Cached report for `repo`, building it on a miss
    ///
    /// A freshly built report is stored only if the working copy is clean.
    pub async fn get_or_create(&mut self, repo: &Path) -> SuitemapResult<SuiteTree> {
        match self.get(repo).await {
            Ok(tree) => return Ok(tree.clone()),
            Err(e) if !e.is_cache_miss() => return Err(e),
            Err(_) => debug!("Cache miss for {}", repo.display()),
        }

        let tree = self.collaborators.builder.build(repo, &self.cancel).await?;

        match self.resolve_key(repo).await? {
            Some(key) => {
                debug!("Caching report {}", key);
                self.entries.insert(key, tree.clone());
            }
            None => debug!("Not caching report for {}", repo.display()),
        }

        Ok(tree)
    }

    /// Current remote branches matching `patterns`, each with its cached
    /// report or `None` when it must be built
    pub async fn get_remote_patterns(
        &self,
        patterns: &[String],
    ) -> SuitemapResult<BTreeMap<CacheKey, Option<&SuiteTree>>> {
        let branches = self
            .collaborators
            .resolver
            .resolve(&self.remote, patterns, &self.cancel)
            .await?;

        Ok(branches
            .into_iter()
            .map(|(branch, revision)| {
                let key = CacheKey::new(branch, revision);
                let tree = self.entries.get(&key);
                (key, tree)
            })
            .collect())
    }

    /// Store a report built elsewhere, e.g. in a worktree of a remote branch
    pub fn insert(&mut self, key: CacheKey, tree: SuiteTree) {
        if self.fingerprint.is_empty() {
            debug!("Caching disabled, dropping report {}", key);
            return;
        }
        self.entries.insert(key, tree);
    }

    /// Write the retained entries and remove every other file
    ///
    /// Entries are always rewritten, in key order.
    pub async fn save(&self) -> SuitemapResult<()> {
        if self.fingerprint.is_empty() {
            debug!("Caching disabled, nothing to save");
            return Ok(());
        }

        fs::create_dir_all(&self.dir).await.map_err(|e| {
            SuitemapError::io(format!("creating cache directory {}", self.dir.display()), e)
        })?;
        self.delete_expired_files().await?;

        for (key, tree) in &self.entries {
            let path = self
                .dir
                .join(codec::generate_file_name(key, &self.fingerprint));
            let bytes = codec::encode(tree, Vec::new())
                .map_err(|e| SuitemapError::io(format!("encoding report {}", key), e))?;
            fs::write(&path, bytes)
                .await
                .map_err(|e| SuitemapError::io(format!("writing cache file {}", path.display()), e))?;
        }

        info!(
            "Saved {} report(s) to {}",
            self.entries.len(),
            self.dir.display()
        );
        Ok(())
    }

    async fn delete_expired_files(&self) -> SuitemapResult<()> {
        for (path, parsed) in list_files(&self.dir).await? {
            let retained = parsed.is_some_and(|(key, fingerprint)| {
                fingerprint == self.fingerprint && self.entries.contains_key(&key)
            });
            if retained {
                continue;
            }

            debug!("Removing expired cache file {}", path.display());
            fs::remove_file(&path).await.map_err(|e| {
                SuitemapError::io(format!("removing cache file {}", path.display()), e)
            })?;
        }
        Ok(())
    }

    /// Retained entries in key order
    pub fn entries(&self) -> impl Iterator<Item = (&CacheKey, &SuiteTree)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Cancellation token passed to every collaborator call
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Builder used for cache misses
    pub fn builder(&self) -> &dyn SuiteBuilder {
        &*self.collaborators.builder
    }

    /// Cache files in `dir`, in name order
    ///
    /// A missing directory has no files.
    pub async fn scan_dir(dir: &Path) -> SuitemapResult<Vec<CacheFile>> {
        let mut files = Vec::new();
        for (path, parsed) in list_files(dir).await? {
            let Some((key, fingerprint)) = parsed else {
                continue;
            };
            let metadata = fs::metadata(&path)
                .await
                .map_err(|e| SuitemapError::io(format!("reading metadata of {}", path.display()), e))?;
            files.push(CacheFile {
                path,
                key,
                fingerprint,
                size_bytes: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }
        Ok(files)
    }

    /// Remove every cache file in `dir`, returning how many were removed
    pub async fn clear_dir(dir: &Path) -> SuitemapResult<usize> {
        let files = Self::scan_dir(dir).await?;
        for file in &files {
            fs::remove_file(&file.path).await.map_err(|e| {
                SuitemapError::io(format!("removing cache file {}", file.path.display()), e)
            })?;
        }
        Ok(files.len())
    }
}

/// Regular files in `dir` with their parsed names, sorted by path
async fn list_files(dir: &Path) -> SuitemapResult<Vec<(PathBuf, Option<(CacheKey, Fingerprint)>)>> {
    if !dir.exists() {
        return Ok(vec![]);
    }

    let mut files = Vec::new();
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| SuitemapError::io(format!("reading cache directory {}", dir.display()), e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SuitemapError::io("reading cache entry", e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| SuitemapError::io("reading cache entry type", e))?;
        if !file_type.is_file() {
            continue;
        }

        let parsed = entry
            .file_name()
            .to_str()
            .and_then(codec::parse_file_name);
        files.push((entry.path(), parsed));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}
