//! Cache manager for persisting API responses to disk
//!
//! Provides a `CacheManager` that stores serializable data to JSON files with
//! expiry timestamps, so stale entries can still be served while the network
//! is unavailable.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{
    de::{DeserializeOwned, IgnoredAny},
    Deserialize, Serialize,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was cached
    cached_at: DateTime<Utc>,
    /// When the cache entry expires
    expires_at: DateTime<Utc>,
}

/// Result of reading from cache, including metadata about cache freshness
#[derive(Debug)]
pub struct CachedData<T> {
    /// The cached data
    pub data: T,
    /// When the data was originally cached
    pub cached_at: DateTime<Utc>,
    /// Whether the cache entry has expired
    pub is_expired: bool,
}

impl<T> CachedData<T> {
    /// How long ago the entry was written
    pub fn age(&self) -> Duration {
        Utc::now() - self.cached_at
    }
}

/// Manages reading and writing cached data to disk
///
/// The cache manager stores data as JSON files in an XDG-compliant cache directory
/// (`~/.cache/courtside/` on Linux). Expired entries are still returned (with
/// `is_expired = true`); only an explicit `remove` deletes them.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a new CacheManager using XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "courtside")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Directory the cache files live in
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to a cache file for the given key
    ///
    /// Characters outside `[A-Za-z0-9_-]` are replaced so arbitrary lookup keys
    /// can't escape the cache directory.
    fn cache_path(&self, key: &str) -> PathBuf {
        let file_stem: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.cache_dir.join(format!("{}.json", file_stem))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Writes data to the cache with the given time-to-live
    ///
    /// # Arguments
    /// * `key` - Unique identifier for the cache entry (e.g., "games_NBA")
    /// * `data` - The data to cache (must implement Serialize)
    /// * `ttl` - How long the cache entry should be considered fresh
    pub fn write<T: Serialize>(&self, key: &str, data: &T, ttl: Duration) -> io::Result<()> {
        self.ensure_dir()?;

        let now = Utc::now();
        let entry = CacheEntry {
            data,
            cached_at: now,
            expires_at: now + ttl,
        };

        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        // Each write gets its own temp file, renamed over the entry when complete
        let mut tmp = NamedTempFile::new_in(&self.cache_dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(self.cache_path(key)).map_err(|e| e.error)?;
        Ok(())
    }

    /// Reads data from the cache
    ///
    /// Returns `None` if the cache entry doesn't exist or cannot be parsed.
    /// Returns `Some(CachedData)` with `is_expired = true` if the entry exists but has expired.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<CachedData<T>> {
        let path = self.cache_path(key);
        let content = fs::read_to_string(path).ok()?;
        let entry: CacheEntry<T> = serde_json::from_str(&content).ok()?;

        let now = Utc::now();
        let is_expired = now > entry.expires_at;

        Some(CachedData {
            data: entry.data,
            cached_at: entry.cached_at,
            is_expired,
        })
    }

    /// When the entry for `key` was written, without decoding its data
    pub fn cached_at(&self, key: &str) -> Option<DateTime<Utc>> {
        let content = fs::read_to_string(self.cache_path(key)).ok()?;
        let entry: CacheEntry<IgnoredAny> = serde_json::from_str(&content).ok()?;
        Some(entry.cached_at)
    }

    /// Deletes the entry only if it is still the one written at `cached_at`
    ///
    /// Returns `false` when a newer write replaced it in the meantime.
    pub fn remove_if_written_at(&self, key: &str, cached_at: DateTime<Utc>) -> io::Result<bool> {
        if self.cached_at(key) != Some(cached_at) {
            return Ok(false);
        }
        self.remove(key)?;
        Ok(true)
    }

    /// Deletes a cache entry; a missing entry is not an error
    pub fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.cache_path(key)) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
