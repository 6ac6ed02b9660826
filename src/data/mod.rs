//! Core data models for Courtside
//!
//! This module contains the domain records shown by the application (games and
//! teams) along with the network client that fetches them from the content API.

pub mod client;

pub use client::{ContentClient, EntitySource, NetworkError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// League ids shown when no config file overrides them
pub const DEFAULT_LEAGUES: [&str; 4] = ["NBA", "NFL", "MLB", "NHL"];

/// A domain record with a stable string identifier
///
/// Entities are immutable once fetched; a newer fetch replaces the cached
/// instance instead of mutating it.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Stable identifier, unique within a lookup key
    fn id(&self) -> &str;
}

/// Lifecycle of a single game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Scheduled,
    Live,
    Final,
    Postponed,
}

/// A single game between two teams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Unique identifier for the game
    pub id: String,
    /// League the game belongs to (e.g. "NBA")
    pub league: String,
    /// Home team id
    pub home: String,
    /// Away team id
    pub away: String,
    /// Home score, absent before tip-off
    #[serde(default)]
    pub home_score: Option<u32>,
    /// Away score, absent before tip-off
    #[serde(default)]
    pub away_score: Option<u32>,
    /// Current game status
    pub status: GameStatus,
    /// Scheduled start time
    pub starts_at: DateTime<Utc>,
}

impl Game {
    /// Whether the given team plays in this game
    pub fn involves(&self, team_id: &str) -> bool {
        self.home == team_id || self.away == team_id
    }

    /// Score line such as "102 - 99", or "vs" when the game hasn't started
    pub fn score_line(&self) -> String {
        match (self.home_score, self.away_score) {
            (Some(home), Some(away)) => format!("{} - {}", home, away),
            _ => "vs".to_string(),
        }
    }
}

impl Entity for Game {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A team and its current season record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier for the team
    pub id: String,
    /// League the team plays in
    pub league: String,
    /// Team name (e.g. "Celtics")
    pub name: String,
    /// Short code (e.g. "BOS")
    pub abbreviation: String,
    /// Home city
    pub city: String,
    /// Wins this season
    #[serde(default)]
    pub wins: u32,
    /// Losses this season
    #[serde(default)]
    pub losses: u32,
}

impl Team {
    /// Full display name, e.g. "Boston Celtics"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.city, self.name)
    }

    /// Fraction of games won, or `None` before the first game
    pub fn win_percentage(&self) -> Option<f64> {
        let played = u64::from(self.wins) + u64::from(self.losses);
        if played == 0 {
            return None;
        }
        Some(self.wins as f64 / played as f64)
    }
}

impl Entity for Team {
    fn id(&self) -> &str {
        &self.id
    }
}
