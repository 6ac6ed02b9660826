//! Background auto-refresh
//!
//! A ticker task tells the application when the visible league is due for a
//! new load cycle. It only signals; the application decides what to reload.

use std::time::Duration;
use tokio::sync::mpsc;

/// Messages sent from the background ticker to the main app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMessage {
    /// The visible data should be reloaded
    ReloadDue,
}

/// Configuration for automatic reloads
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Interval between reloads
    pub interval: Duration,
    /// Whether auto-refresh is enabled
    pub enabled: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            enabled: true,
        }
    }
}

/// Handle for controlling the background ticker
pub struct RefreshHandle {
    /// Channel for receiving refresh messages
    pub receiver: mpsc::Receiver<RefreshMessage>,
    /// Signals the ticker to stop
    shutdown_tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Creates a new RefreshHandle and spawns the ticker task
    ///
    /// The first tick fires one full interval after spawning. With
    /// `enabled = false` no task is spawned and no message ever arrives.
    pub fn spawn(config: RefreshConfig) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel(8);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        if config.enabled {
            let interval = config.interval;

            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                // Skip the first tick (immediate)
                ticker.tick().await;

                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            // A full channel means a reload is already pending
                            if let Err(mpsc::error::TrySendError::Closed(_)) =
                                msg_tx.try_send(RefreshMessage::ReloadDue)
                            {
                                break;
                            }
                        }
                        _ = shutdown_rx.recv() => {
                            break;
                        }
                    }
                }
            });
        }

        Self {
            receiver: msg_rx,
            shutdown_tx,
        }
    }

    /// Shuts down the background ticker
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Checks for pending refresh messages without blocking
///
/// # Returns
/// * `Some(RefreshMessage)` if a message was available
/// * `None` if no messages are pending
pub fn try_recv(handle: &mut RefreshHandle) -> Option<RefreshMessage> {
    handle.receiver.try_recv().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_config_default() {
        let config = RefreshConfig::default();
        assert_eq!(config.interval, Duration::from_secs(60));
        assert!(config.enabled);
    }

    #[tokio::test]
    async fn test_refresh_handle_spawn_disabled() {
        let config = RefreshConfig {
            enabled: false,
            ..Default::default()
        };

        let mut handle = RefreshHandle::spawn(config);

        // With refresh disabled, there should be no messages
        assert!(try_recv(&mut handle).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_fires_after_interval() {
        let mut handle = RefreshHandle::spawn(RefreshConfig {
            interval: Duration::from_secs(30),
            enabled: true,
        });

        tokio::task::yield_now().await;
        assert!(try_recv(&mut handle).is_none(), "No tick before the interval");

        let message = handle.receiver.recv().await;

        assert_eq!(message, Some(RefreshMessage::ReloadDue));
        handle.shutdown().await;
    }
}
