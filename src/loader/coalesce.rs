use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-key locks serializing network fetches
///
/// Holding the guard returned by [`InFlightFetches::acquire`] marks a fetch for
/// that key as in flight; a second caller for the same key waits until it is
/// released. Different keys never contend.
#[derive(Debug, Default)]
pub struct InFlightFetches {
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl InFlightFetches {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut inflight = self.inflight.lock().await;
            // Locks nobody holds or waits on only keep the map growing
            inflight.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(
                inflight
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}
