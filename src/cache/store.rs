//! Entity caches used by the content loader
//!
//! [`EntityCache`] is the contract the loader reads and writes through. Two
//! implementations are provided: [`DiskCache`] persists collections through a
//! [`CacheManager`], and [`MemoryCache`] keeps them in-process for sessions
//! without a usable cache directory.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

use super::CacheManager;
use crate::data::Entity;

/// Errors raised by cache writes and maintenance
///
/// The loader never surfaces these to the presentation layer; they are logged
/// and swallowed.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing a cache file failed
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Cache collaborator: keyed collections of entities
#[async_trait]
pub trait EntityCache<T>: Send + Sync {
    /// Entities stored under `key`; empty when nothing is cached
    fn get_entities(&self, key: &str) -> Vec<T>;

    /// Replaces the collection stored under `key`
    fn save_entities(&self, entities: &[T], key: &str) -> Result<(), CacheError>;

    /// Best-effort maintenance of the entry for `key`
    async fn refresh_if_needed(&self, key: &str) -> Result<(), CacheError>;

    /// When the collection under `key` was last saved
    fn last_saved(&self, key: &str) -> Option<DateTime<Utc>>;
}

/// De-duplicates a collection by id
///
/// When an id appears more than once the last record wins but keeps the
/// position of the first occurrence.
pub fn canonicalize<T: Entity>(entities: &[T]) -> Vec<T> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut canonical: Vec<T> = Vec::with_capacity(entities.len());

    for entity in entities {
        match positions.get(entity.id()) {
            Some(&index) => canonical[index] = entity.clone(),
            None => {
                positions.insert(entity.id(), canonical.len());
                canonical.push(entity.clone());
            }
        }
    }

    canonical
}

/// Disk-backed entity cache
///
/// Each lookup key maps to one JSON file named `<namespace>_<key>.json`.
/// Entries older than `max_stale` are evicted by `refresh_if_needed`.
#[derive(Debug, Clone)]
pub struct DiskCache<T> {
    manager: CacheManager,
    namespace: String,
    ttl: Duration,
    max_stale: Duration,
    _entity: PhantomData<fn() -> T>,
}

impl<T> DiskCache<T> {
    /// Creates a disk cache storing entities under the given namespace
    ///
    /// # Arguments
    /// * `manager` - File store the entries are written through
    /// * `namespace` - Prefix separating entity kinds (e.g. "games", "teams")
    /// * `ttl` - How long a saved collection counts as fresh
    /// * `max_stale` - Age after which an entry is evicted outright
    pub fn new(
        manager: CacheManager,
        namespace: impl Into<String>,
        ttl: Duration,
        max_stale: Duration,
    ) -> Self {
        Self {
            manager,
            namespace: namespace.into(),
            ttl,
            max_stale,
            _entity: PhantomData,
        }
    }

    fn file_key(&self, key: &str) -> String {
        format!("{}_{}", self.namespace, key)
    }
}

#[async_trait]
impl<T> EntityCache<T> for DiskCache<T>
where
    T: Entity + Serialize + DeserializeOwned,
{
    fn get_entities(&self, key: &str) -> Vec<T> {
        self.manager
            .read::<Vec<T>>(&self.file_key(key))
            .map(|cached| cached.data)
            .unwrap_or_default()
    }

    fn save_entities(&self, entities: &[T], key: &str) -> Result<(), CacheError> {
        self.manager
            .write(&self.file_key(key), &canonicalize(entities), self.ttl)?;
        Ok(())
    }

    async fn refresh_if_needed(&self, key: &str) -> Result<(), CacheError> {
        let file_key = self.file_key(key);
        let Some(cached) = self.manager.read::<Vec<T>>(&file_key) else {
            return Ok(());
        };

        if cached.age() > self.max_stale {
            // A save since the read replaced the entry; keep it
            if self.manager.remove_if_written_at(&file_key, cached.cached_at)? {
                debug!(
                    key = %file_key,
                    age_hours = cached.age().num_hours(),
                    "evicted dead cache entry"
                );
            }
        } else if cached.is_expired {
            debug!(key = %file_key, "cache entry is stale");
        }

        Ok(())
    }

    fn last_saved(&self, key: &str) -> Option<DateTime<Utc>> {
        self.manager
            .read::<Vec<T>>(&self.file_key(key))
            .map(|cached| cached.cached_at)
    }
}

/// In-process entity cache
#[derive(Debug)]
pub struct MemoryCache<T> {
    entries: RwLock<HashMap<String, (Vec<T>, DateTime<Utc>)>>,
}

impl<T> Default for MemoryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MemoryCache<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<T: Entity> EntityCache<T> for MemoryCache<T> {
    fn get_entities(&self, key: &str) -> Vec<T> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map(|(entities, _)| entities.clone())
            .unwrap_or_default()
    }

    fn save_entities(&self, entities: &[T], key: &str) -> Result<(), CacheError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), (canonicalize(entities), Utc::now()));
        Ok(())
    }

    async fn refresh_if_needed(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    fn last_saved(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map(|(_, saved_at)| *saved_at)
    }
}
