//! Log output setup
//!
//! The terminal belongs to the UI, so log lines go to `courtside.log` in the
//! cache directory. Logging is off unless `COURTSIDE_LOG` holds a filter such as
//! `courtside=debug`.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "COURTSIDE_LOG";

/// Log file name inside the log directory
pub const LOG_FILE: &str = "courtside.log";

/// Filter from `COURTSIDE_LOG`, or `None` when unset or unparsable
pub fn filter_from_env() -> Option<EnvFilter> {
    EnvFilter::try_from_env(LOG_ENV).ok()
}

/// Installs the global subscriber
///
/// # Returns
/// * `Ok(Some(path))` - Logging to the file at `path`
/// * `Ok(None)` - Logging disabled (no filter or no log directory)
/// * `Err` - The log file couldn't be opened
pub fn init(log_dir: Option<&Path>) -> io::Result<Option<PathBuf>> {
    let (Some(filter), Some(log_dir)) = (filter_from_env(), log_dir) else {
        return Ok(None);
    };

    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(LOG_FILE);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))?;

    Ok(Some(path))
}
