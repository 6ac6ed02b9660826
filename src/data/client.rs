//! Content API client
//!
//! Fetches games and teams for a league from the remote content API. The
//! client is also the production implementation of [`EntitySource`], the
//! network contract the content loader depends on.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::{Game, Team};

/// Default timeout for a single request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when fetching from the content API
#[derive(Debug, Error)]
pub enum NetworkError {
    /// HTTP request failed (transport error or timeout)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server returned {status} for {url}")]
    Status { status: u16, url: String },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL cannot carry path segments
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl NetworkError {
    /// Whether the server rejected the request itself (4xx)
    ///
    /// Informational only: the loader retries every failure the same way.
    pub fn is_client_error(&self) -> bool {
        match self {
            NetworkError::Status { status, .. } => (400..500).contains(status),
            NetworkError::InvalidBaseUrl(_) => true,
            NetworkError::RequestFailed(_) | NetworkError::Decode(_) => false,
        }
    }
}

/// Network collaborator: fetches the complete entity collection for a key
///
/// Implementations either return every entity for the key or fail; partial
/// results are never returned.
#[async_trait]
pub trait EntitySource<T>: Send + Sync {
    async fn fetch_entities(&self, key: &str) -> Result<Vec<T>, NetworkError>;
}

/// Client for the content API
#[derive(Debug, Clone)]
pub struct ContentClient {
    client: Client,
    base_url: Url,
}

impl ContentClient {
    /// Create a new ContentClient with the given base URL and request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, NetworkError> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url)
    }

    /// Create a new ContentClient with a custom HTTP client
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, NetworkError> {
        let base_url =
            Url::parse(base_url).map_err(|_| NetworkError::InvalidBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(NetworkError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    /// Builds `{base}/leagues/{league}/{resource}`
    fn endpoint(&self, league: &str, resource: &str) -> Result<Url, NetworkError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| NetworkError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["leagues", league, resource]);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, NetworkError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Fetch all games currently listed for a league
    ///
    /// # Returns
    /// * `Ok(Vec<Game>)` - Every game the API lists for the league
    /// * `Err(NetworkError)` - If the request, status or parsing fails
    pub async fn fetch_games(&self, league: &str) -> Result<Vec<Game>, NetworkError> {
        let url = self.endpoint(league, "games")?;
        self.get_json(url).await
    }

    /// Fetch all teams in a league
    pub async fn fetch_teams(&self, league: &str) -> Result<Vec<Team>, NetworkError> {
        let url = self.endpoint(league, "teams")?;
        self.get_json(url).await
    }
}

#[async_trait]
impl EntitySource<Game> for ContentClient {
    async fn fetch_entities(&self, key: &str) -> Result<Vec<Game>, NetworkError> {
        self.fetch_games(key).await
    }
}

#[async_trait]
impl EntitySource<Team> for ContentClient {
    async fn fetch_entities(&self, key: &str) -> Result<Vec<Team>, NetworkError> {
        self.fetch_teams(key).await
    }
}
