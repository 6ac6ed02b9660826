//! Finding a single entity across several lookup keys

use futures::future::join_all;
use tracing::{debug, warn};

use super::{ContentLoader, LoadError};
use crate::data::Entity;

impl<T: Entity> ContentLoader<T> {
    /// Finds the entity with `id` in any of `keys`
    ///
    /// Cached collections are scanned first, in key order. On a miss every key
    /// is fetched concurrently under the retry policy; successful fetches are
    /// persisted whether or not they contain the entity. The first key (in the
    /// given order) whose collection contains `id` wins.
    ///
    /// # Returns
    /// * `Ok(T)` - The entity
    /// * `Err(LoadError::NotFound)` - At least one key was fetched and none contains `id`
    /// * `Err(LoadError::NetworkFailure)` - Every fetch failed
    pub async fn find(&self, id: &str, keys: &[String]) -> Result<T, LoadError> {
        for key in keys {
            if let Some(hit) = self.cache.get_entities(key).into_iter().find(|e| e.id() == id) {
                debug!(id, key = %key, "lookup served from cache");
                return Ok(hit);
            }
        }

        let fetches = keys.iter().map(|key| async move { (key, self.fetch(key).await) });
        let results = join_all(fetches).await;

        let mut found = None;
        let mut any_succeeded = false;
        let mut last_error = None;

        for (key, result) in results {
            match result {
                Ok(fetched) => {
                    any_succeeded = true;
                    let stored = self.persist(key, &fetched);
                    if found.is_none() {
                        found = stored.into_iter().find(|e| e.id() == id);
                    }
                }
                Err(err) => {
                    warn!(id, key = %key, error = %err, "lookup fetch failed");
                    last_error = Some(err);
                }
            }
        }

        match (found, last_error) {
            (Some(entity), _) => Ok(entity),
            (None, Some(err)) if !any_succeeded => Err(err.into()),
            (None, _) => Err(LoadError::NotFound(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{EntityCache, MemoryCache};
    use crate::data::{EntitySource, NetworkError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::loader::RetryPolicy;

    #[derive(Debug, Clone, PartialEq)]
    struct Team {
        id: String,
        league: String,
    }

    impl Entity for Team {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn team(id: &str, league: &str) -> Team {
        Team {
            id: id.to_string(),
            league: league.to_string(),
        }
    }

    /// Serves fixed rosters per league; leagues missing from the map fail
    struct Rosters {
        by_league: HashMap<String, Vec<Team>>,
        calls: AtomicUsize,
    }

    impl Rosters {
        fn new(entries: Vec<(&str, Vec<Team>)>) -> Self {
            Self {
                by_league: entries
                    .into_iter()
                    .map(|(league, teams)| (league.to_string(), teams))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EntitySource<Team> for Rosters {
        async fn fetch_entities(&self, key: &str) -> Result<Vec<Team>, NetworkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.by_league
                .get(key)
                .cloned()
                .ok_or_else(|| NetworkError::Status {
                    status: 502,
                    url: format!("http://test/leagues/{}/teams", key),
                })
        }
    }

    fn leagues(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    fn lookup_loader(cache: Arc<MemoryCache<Team>>, source: Arc<Rosters>) -> ContentLoader<Team> {
        ContentLoader::<Team>::new(cache, source)
            .with_retry(RetryPolicy::new(1, Duration::from_millis(10)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_skips_network() {
        let cache = Arc::new(MemoryCache::new());
        cache.save_entities(&[team("bos", "NBA")], "NBA").unwrap();
        let source = Arc::new(Rosters::new(vec![]));
        let loader = lookup_loader(cache, Arc::clone(&source));

        let found = loader.find("bos", &leagues(&["NFL", "NBA"])).await.unwrap();

        assert_eq!(found, team("bos", "NBA"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_hit_is_persisted() {
        let cache = Arc::new(MemoryCache::new());
        let source = Arc::new(Rosters::new(vec![
            ("NBA", vec![team("bos", "NBA")]),
            ("NHL", vec![team("tor", "NHL")]),
        ]));
        let loader = lookup_loader(Arc::clone(&cache), source);

        let found = loader.find("tor", &leagues(&["NBA", "NHL"])).await.unwrap();

        assert_eq!(found, team("tor", "NHL"));
        assert_eq!(cache.get_entities("NBA"), vec![team("bos", "NBA")]);
        assert_eq!(cache.get_entities("NHL"), vec![team("tor", "NHL")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_id_is_not_found() {
        let cache = Arc::new(MemoryCache::new());
        let source = Arc::new(Rosters::new(vec![("NBA", vec![team("bos", "NBA")])]));
        let loader = lookup_loader(cache, source);

        let err = loader.find("xyz", &leagues(&["NBA", "MLS"])).await.unwrap_err();

        assert_eq!(err, LoadError::NotFound("xyz".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_sources_failing_is_network_failure() {
        let cache = Arc::new(MemoryCache::new());
        let source = Arc::new(Rosters::new(vec![]));
        let loader = lookup_loader(cache, Arc::clone(&source));

        let err = loader.find("bos", &leagues(&["NBA", "NFL"])).await.unwrap_err();

        assert!(matches!(err, LoadError::NetworkFailure(_)));
        // Two attempts per league
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_keys_is_not_found() {
        let loader = lookup_loader(Arc::new(MemoryCache::new()), Arc::new(Rosters::new(vec![])));

        let err = loader.find("bos", &[]).await.unwrap_err();

        assert!(matches!(err, LoadError::NotFound(_)));
    }
}
