// src/version/cache.rs

//! Persistent cache of upstream version probes
//!
//! Stored as `.version-cache` at the repository root: a YAML map of package
//! name to `{latest_version, timestamp}` with millisecond epoch timestamps.
//! The cache only saves re-running check scripts, so read and write
//! failures degrade to an empty cache with a warning.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the cache file at a repository root
pub const VERSION_CACHE_FILE: &str = ".version-cache";

/// How long a probe result stays fresh (7 days)
pub const FRESHNESS_WINDOW_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Current time in milliseconds since the UNIX epoch
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// One memoized probe result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedVersionEntry {
    pub latest_version: String,
    /// Milliseconds since the UNIX epoch
    pub timestamp: i64,
}

impl CachedVersionEntry {
    pub fn is_fresh(&self, now: i64) -> bool {
        now - self.timestamp < FRESHNESS_WINDOW_MS
    }
}

/// In-memory view of `.version-cache`
#[derive(Debug, Default)]
pub struct VersionCache {
    path: PathBuf,
    entries: BTreeMap<String, CachedVersionEntry>,
}

impl VersionCache {
    /// Load the cache for the repository at `repo_root`
    ///
    /// A missing file is an empty cache; an unreadable or corrupt one is
    /// also treated as empty after a warning.
    pub fn load(repo_root: &Path) -> Self {
        let path = repo_root.join(VERSION_CACHE_FILE);
        let entries = match Self::read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring version cache: {}", e);
                BTreeMap::new()
            }
        };
        let cache = Self { path, entries };
        if cache.is_empty() {
            debug!("Version cache is empty");
        } else {
            debug!("Loaded {} cached versions", cache.len());
        }
        cache
    }

    fn read_entries(path: &Path) -> Result<BTreeMap<String, CachedVersionEntry>> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if data.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(BTreeMap::new());
        }
        serde_yaml::from_slice(&data).map_err(|e| Error::CacheCorrupt(e.to_string()))
    }

    /// Cached version for `name` if one exists and is still fresh
    pub fn fresh(&self, name: &str, now: i64) -> Option<&str> {
        self.entries
            .get(name)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.latest_version.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&CachedVersionEntry> {
        self.entries.get(name)
    }

    pub fn insert(&mut self, name: &str, latest_version: &str, now: i64) {
        self.entries.insert(
            name.to_string(),
            CachedVersionEntry {
                latest_version: latest_version.to_string(),
                timestamp: now,
            },
        );
    }

    pub fn remove(&mut self, name: &str) -> Option<CachedVersionEntry> {
        self.entries.remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the cache back to disk
    pub fn save(&self) -> Result<()> {
        let data =
            serde_yaml::to_string(&self.entries).map_err(|e| Error::CacheCorrupt(e.to_string()))?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
