//! Command-line interface parsing for Courtside
//!
//! Handles CLI arguments using clap: the startup league, an optional team to
//! open directly, the cache switch and an alternate config file.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::config::Config;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The requested league isn't one of the configured leagues
    #[error("Unknown league: '{league}'. Configured leagues: {available}")]
    UnknownLeague { league: String, available: String },

    /// `--team` was given an empty id
    #[error("Team id must not be empty")]
    EmptyTeamId,
}

/// Courtside - Live scores, teams and standings in your terminal
#[derive(Parser, Debug)]
#[command(name = "courtside")]
#[command(about = "Live scores, teams and standings in your terminal")]
#[command(version)]
pub struct Cli {
    /// League to open on startup (e.g. NBA, NHL)
    #[arg(long, short, value_name = "LEAGUE")]
    pub league: Option<String>,

    /// Open a team's detail screen, searching every configured league
    ///
    /// Examples:
    ///   courtside --team bos
    ///   courtside --league NHL --team tor
    #[arg(long, value_name = "TEAM_ID")]
    pub team: Option<String>,

    /// Keep fetched data in memory only instead of the on-disk cache
    #[arg(long)]
    pub no_cache: bool,

    /// Read settings from this file instead of the default config location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Settings derived from CLI arguments and config for application startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    /// League shown first
    pub league: String,
    /// Team to look up and open, if any
    pub team: Option<String>,
    /// Whether the on-disk cache should be used
    pub use_disk_cache: bool,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments and the loaded config.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if the league is unknown or the team id is empty
    pub fn from_cli(cli: &Cli, config: &Config) -> Result<Self, CliError> {
        let league = match &cli.league {
            None => config.default_league.clone(),
            Some(requested) => config
                .find_league(requested)
                .map(str::to_string)
                .ok_or_else(|| CliError::UnknownLeague {
                    league: requested.clone(),
                    available: config.leagues.join(", "),
                })?,
        };

        let team = match &cli.team {
            Some(id) if id.trim().is_empty() => return Err(CliError::EmptyTeamId),
            Some(id) => Some(id.trim().to_string()),
            None => None,
        };

        Ok(StartupConfig {
            league,
            team,
            use_disk_cache: !cli.no_cache,
        })
    }
}
