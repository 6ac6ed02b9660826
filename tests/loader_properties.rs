//! Behavioural tests for the content loader through the public API
//!
//! Runs against the in-memory cache and a recording source on a paused clock,
//! so backoff waits complete instantly but stay measurable.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use courtside::cache::{EntityCache, MemoryCache};
use courtside::data::{Entity, EntitySource, NetworkError};
use courtside::loader::{ContentLoader, LoadError, RetryPolicy};

#[derive(Debug, Clone, PartialEq)]
struct Game {
    id: String,
}

impl Entity for Game {
    fn id(&self) -> &str {
        &self.id
    }
}

fn games(ids: &[&str]) -> Vec<Game> {
    ids.iter()
        .map(|id| Game { id: id.to_string() })
        .collect()
}

/// Fails the first `failures` calls, then serves `games`; records call times
struct RecordingSource {
    failures: usize,
    games: Vec<Game>,
    calls: Mutex<Vec<Instant>>,
}

impl RecordingSource {
    fn new(failures: usize, games: Vec<Game>) -> Arc<Self> {
        Arc::new(Self {
            failures,
            games,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn always_failing() -> Arc<Self> {
        Self::new(usize::MAX, Vec::new())
    }

    fn attempts(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Gaps between consecutive attempts
    fn gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

#[async_trait]
impl EntitySource<Game> for RecordingSource {
    async fn fetch_entities(&self, key: &str) -> Result<Vec<Game>, NetworkError> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Instant::now());
            calls.len()
        };
        if attempt <= self.failures {
            return Err(NetworkError::Status {
                status: 503,
                url: format!("http://test/leagues/{}/games", key),
            });
        }
        Ok(self.games.clone())
    }
}

fn setup(source: Arc<RecordingSource>) -> (Arc<MemoryCache<Game>>, ContentLoader<Game>) {
    let cache = Arc::new(MemoryCache::new());
    let loader = ContentLoader::<Game>::new(cache.clone(), source);
    (cache, loader)
}

fn assert_close(actual: Duration, expected: Duration) {
    let tolerance = Duration::from_millis(5);
    assert!(
        actual >= expected && actual <= expected + tolerance,
        "expected ~{:?}, got {:?}",
        expected,
        actual
    );
}

#[tokio::test(start_paused = true)]
async fn cached_entities_survive_a_failing_network() {
    let source = RecordingSource::always_failing();
    let (cache, loader) = setup(source.clone());
    cache.save_entities(&games(&["g1"]), "NBA").unwrap();

    let result = loader.load("NBA").await;

    assert_eq!(result.entities, games(&["g1"]));
    assert!(result.error.is_none());
    assert!(!result.loading);
    assert_eq!(source.attempts(), 3);
}

#[tokio::test(start_paused = true)]
async fn empty_cache_and_failing_network_reports_error() {
    let (_cache, loader) = setup(RecordingSource::always_failing());

    let result = loader.load("NBA").await;

    assert!(result.entities.is_empty());
    assert!(!result.loading);
    assert!(matches!(result.error, Some(LoadError::NetworkFailure(_))));
}

#[tokio::test(start_paused = true)]
async fn two_failures_then_success_uses_three_attempts() {
    let source = RecordingSource::new(2, games(&["g1", "g2"]));
    let (_cache, loader) = setup(source.clone());

    let result = loader.load("NBA").await;

    assert_eq!(result.entities, games(&["g1", "g2"]));
    assert!(result.error.is_none());
    assert_eq!(source.attempts(), 3);
}

#[tokio::test(start_paused = true)]
async fn backoff_grows_linearly() {
    let source = RecordingSource::always_failing();
    let (_cache, loader) = setup(source.clone());

    loader.load("NBA").await;

    let gaps = source.gaps();
    assert_eq!(gaps.len(), 2);
    assert_close(gaps[0], Duration::from_millis(500));
    assert_close(gaps[1], Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn custom_policy_bounds_attempts() {
    let source = RecordingSource::always_failing();
    let (_cache, loader) = setup(source.clone());
    let loader = loader.with_retry(RetryPolicy::new(4, Duration::from_millis(100)));

    loader.load("NHL").await;

    assert_eq!(source.attempts(), 5);
    let gaps = source.gaps();
    assert_close(gaps[3], Duration::from_millis(400));
}

#[tokio::test(start_paused = true)]
async fn repeated_loads_are_idempotent() {
    let (_cache, loader) = setup(RecordingSource::new(0, games(&["g1", "g2"])));

    let first = loader.load("NBA").await;
    let second = loader.load("NBA").await;

    assert_eq!(first.entities, second.entities);
    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn fresh_fetch_populates_the_cache() {
    let source = RecordingSource::new(0, games(&["g1", "g2"]));
    let (cache, loader) = setup(source.clone());

    let result = loader.load("NBA").await;

    assert_eq!(source.attempts(), 1);
    assert_eq!(result.key, "NBA");
    assert!(!result.loading);
    assert!(result.error.is_none());
    assert_eq!(result.entities, games(&["g1", "g2"]));
    assert_eq!(cache.get_entities("NBA"), games(&["g1", "g2"]));
    assert!(loader.last_updated("NBA").is_some());
}

#[tokio::test(start_paused = true)]
async fn stale_entities_are_kept_after_three_failures() {
    let (cache, loader) = setup(RecordingSource::always_failing());
    cache.save_entities(&games(&["g1"]), "NBA").unwrap();

    let result = loader.load("NBA").await;

    assert!(!result.loading);
    assert!(result.error.is_none());
    assert_eq!(result.entities, games(&["g1"]));
    assert_eq!(cache.get_entities("NBA"), games(&["g1"]));
}

#[tokio::test(start_paused = true)]
async fn keys_are_cached_independently() {
    let (cache, loader) = setup(RecordingSource::new(0, games(&["g9"])));
    cache.save_entities(&games(&["g1"]), "NHL").unwrap();

    loader.load("NBA").await;

    assert_eq!(cache.get_entities("NHL"), games(&["g1"]));
    assert_eq!(cache.get_entities("NBA"), games(&["g9"]));
}

/// Only the second call succeeds, whoever makes it
struct SecondCallWins {
    calls: AtomicUsize,
}

#[async_trait]
impl EntitySource<Game> for SecondCallWins {
    async fn fetch_entities(&self, key: &str) -> Result<Vec<Game>, NetworkError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 1 {
            return Ok(games(&["g1"]));
        }
        Err(NetworkError::Status {
            status: 503,
            url: format!("http://test/leagues/{}/games", key),
        })
    }
}

#[tokio::test(start_paused = true)]
async fn overlapping_success_is_not_replaced_by_a_late_failure() {
    let cache = Arc::new(MemoryCache::new());
    let source = Arc::new(SecondCallWins {
        calls: AtomicUsize::new(0),
    });
    let loader = Arc::new(ContentLoader::<Game>::new(cache.clone(), source));
    let updates = loader.subscribe();

    let early = {
        let loader = Arc::clone(&loader);
        tokio::spawn(async move { loader.load("NBA").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    let late = loader.load("NBA").await;
    let early = early.await.unwrap();

    assert_eq!(late.entities, games(&["g1"]));
    assert!(late.error.is_none());
    assert_eq!(early.entities, games(&["g1"]));
    assert!(early.error.is_none(), "A failed retry must not hide fetched data");
    assert_eq!(cache.get_entities("NBA"), games(&["g1"]));

    let published = updates.borrow().clone();
    assert_eq!(published.entities, games(&["g1"]));
    assert!(published.error.is_none());
    assert!(!published.loading);
}
