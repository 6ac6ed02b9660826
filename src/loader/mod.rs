//! Stale-while-revalidate content loading
//!
//! A [`ContentLoader`] serves whatever the cache holds for a lookup key right
//! away, kicks off background cache maintenance, then fetches from the network
//! with bounded retries. A successful fetch is persisted and republished; a
//! failed one only becomes a visible error when there is nothing cached to show.
//!
//! Every stage transition is published on a `watch` channel so the presentation
//! layer can subscribe instead of awaiting the load.

mod coalesce;
mod lookup;
mod retry;

pub use retry::{fetch_with_retry, RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::cache::{canonicalize, EntityCache};
use crate::data::{Entity, EntitySource, NetworkError};
use coalesce::InFlightFetches;

/// Errors the presentation layer may be shown
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Transport failure, timeout or server error
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// No source holds an entity with the requested id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Anything else, e.g. a misconfigured API endpoint
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<NetworkError> for LoadError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::InvalidBaseUrl(_) => LoadError::Unknown(err.to_string()),
            NetworkError::RequestFailed(_)
            | NetworkError::Status { .. }
            | NetworkError::Decode(_) => LoadError::NetworkFailure(err.to_string()),
        }
    }
}

/// Best-known view of the entities for a key during one load cycle
#[derive(Debug, Clone, PartialEq)]
pub struct LoadResult<T> {
    /// Lookup key this result belongs to
    pub key: String,
    /// Entities currently visible
    pub entities: Vec<T>,
    /// Whether the network stage is still running
    pub loading: bool,
    /// Set only when the network failed and nothing is visible
    pub error: Option<LoadError>,
}

impl<T> LoadResult<T> {
    /// Result for a key no load cycle has touched yet
    pub fn idle(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entities: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

/// Whether concurrent loads of one key may fetch at the same time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// Every load fetches independently
    #[default]
    Concurrent,
    /// At most one network fetch per key is in flight; later loads wait for it
    SingleFlight,
}

/// Cache-first loader for one entity type
///
/// Collaborators are injected at construction so tests can substitute doubles.
pub struct ContentLoader<T> {
    cache: Arc<dyn EntityCache<T>>,
    source: Arc<dyn EntitySource<T>>,
    retry: RetryPolicy,
    in_flight: Option<InFlightFetches>,
    publisher: watch::Sender<LoadResult<T>>,
}

impl<T: Entity> ContentLoader<T> {
    /// Creates a loader with the default retry policy and concurrent fetches
    pub fn new(cache: Arc<dyn EntityCache<T>>, source: Arc<dyn EntitySource<T>>) -> Self {
        let (publisher, _) = watch::channel(LoadResult::idle(""));
        Self {
            cache,
            source,
            retry: RetryPolicy::default(),
            in_flight: None,
            publisher,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_fetch_mode(mut self, mode: FetchMode) -> Self {
        self.in_flight = match mode {
            FetchMode::Concurrent => None,
            FetchMode::SingleFlight => Some(InFlightFetches::new()),
        };
        self
    }

    /// Receives every result published by this loader, for any key
    pub fn subscribe(&self) -> watch::Receiver<LoadResult<T>> {
        self.publisher.subscribe()
    }

    /// When the cache last received entities for `key`
    pub fn last_updated(&self, key: &str) -> Option<DateTime<Utc>> {
        self.cache.last_saved(key)
    }

    /// Runs one load cycle for `key`
    ///
    /// Publishes the cached view (with `loading = true`) first, then the final
    /// result, which is also returned. Always terminates with `loading = false`
    /// and never replaces visible entities with an error.
    pub async fn load(&self, key: &str) -> LoadResult<T> {
        let entities = self.visible_now(key);
        debug!(key, visible = entities.len(), "load started");

        let mut result = LoadResult {
            key: key.to_string(),
            entities,
            loading: true,
            error: None,
        };
        self.publish(&result);

        self.spawn_refresh(key);

        match self.fetch(key).await {
            Ok(fetched) => {
                result.entities = self.persist(key, &fetched);
                result.error = None;
                debug!(key, entities = result.entities.len(), "load finished");
            }
            Err(err) => {
                // Another load of this key may have succeeded while we retried
                let current = self.visible_now(key);
                if !current.is_empty() {
                    result.entities = current;
                }
                warn!(
                    key,
                    error = %err,
                    client_error = err.is_client_error(),
                    keeping_stale = !result.entities.is_empty(),
                    "fetch failed after retries"
                );
                if result.entities.is_empty() {
                    result.error = Some(err.into());
                }
            }
        }

        result.loading = false;
        self.publish(&result);
        result
    }

    /// Network fetch for `key` under the retry policy and fetch mode
    async fn fetch(&self, key: &str) -> Result<Vec<T>, NetworkError> {
        let _in_flight = match &self.in_flight {
            Some(in_flight) => Some(in_flight.acquire(key).await),
            None => None,
        };

        let source = &self.source;
        fetch_with_retry(&self.retry, move |_| source.fetch_entities(key)).await
    }

    /// Saves fetched entities and returns the canonical cached view
    fn persist(&self, key: &str, fetched: &[T]) -> Vec<T> {
        if let Err(err) = self.cache.save_entities(fetched, key) {
            warn!(key, error = %err, "failed to persist fetched entities");
            return canonicalize(fetched);
        }

        let stored = self.cache.get_entities(key);
        if stored.is_empty() && !fetched.is_empty() {
            // Evicted between the write and the read
            return canonicalize(fetched);
        }
        stored
    }

    /// What a consumer sees for `key` right now: the cache, else the last publish
    fn visible_now(&self, key: &str) -> Vec<T> {
        let cached = self.cache.get_entities(key);
        if cached.is_empty() {
            self.last_visible(key)
        } else {
            cached
        }
    }

    /// Entities this loader last published for `key`, if it was the last key
    fn last_visible(&self, key: &str) -> Vec<T> {
        let last = self.publisher.borrow();
        if last.key == key {
            last.entities.clone()
        } else {
            Vec::new()
        }
    }

    fn spawn_refresh(&self, key: &str) {
        let cache = Arc::clone(&self.cache);
        let key = key.to_string();
        tokio::spawn(async move {
            if let Err(err) = cache.refresh_if_needed(&key).await {
                warn!(key = %key, error = %err, "background cache refresh failed");
            }
        });
    }

    fn publish(&self, result: &LoadResult<T>) {
        self.publisher.send_replace(result.clone());
    }
}
