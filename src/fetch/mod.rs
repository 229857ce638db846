//! HTTP client for the board backend.
//!
//! Wraps the backend's JSON and CSV endpoints. Callers decide how to
//! degrade on failure; this layer only reports what went wrong.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::models::{PlayerId, SnapshotRecord};
use crate::ranking::PaginationMeta;

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Rate limited by {host}, retry after {retry_after_secs}s")]
    RateLimited { host: String, retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Content too large: {size} bytes (max {max_size})")]
    ContentTooLarge { size: usize, max_size: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for the backend client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend root, e.g. `http://127.0.0.1:8000`
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,

    /// Maximum response body size (default 16MB)
    pub max_content_size: usize,

    /// User agent string
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout: Duration::from_secs(30),
            max_content_size: 16 * 1024 * 1024,
            user_agent: concat!("versus-board/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// `GET /api/files`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilesResponse {
    #[serde(default)]
    pub files: Vec<String>,
}

/// `GET /api/player-names`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamesResponse {
    #[serde(rename = "nameMapping", default)]
    pub name_mapping: BTreeMap<PlayerId, String>,
}

/// `GET /api/player-history/<id>`
///
/// `player` and `stats` are passed through untyped; only the snapshot
/// sequence is interpreted here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub player: serde_json::Value,
    #[serde(default)]
    pub history: Vec<SnapshotRecord>,
    #[serde(default)]
    pub stats: serde_json::Value,
    #[serde(default)]
    pub days: Option<u32>,
}

/// Query for the paginated stats snapshot endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub search: Option<String>,
    pub rank_filter: Option<String>,
}

impl SnapshotParams {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            pairs.push(("per_page", per_page.to_string()));
        }
        let text = [
            ("sort_by", &self.sort_by),
            ("sort_order", &self.sort_order),
            ("search", &self.search),
            ("rank_filter", &self.rank_filter),
        ];
        for (key, value) in text {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                pairs.push((key, value.to_string()));
            }
        }
        pairs
    }
}

/// One row of the stats snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotPlayer {
    pub rank: Option<u32>,
    #[serde(alias = "pid")]
    pub player_id: String,
    #[serde(alias = "name")]
    pub display_name: String,
    #[serde(alias = "versus_won")]
    pub total_wins: u64,
    #[serde(alias = "versus_plays")]
    pub total_plays: u64,
    #[serde(alias = "versus_rating", alias = "rating")]
    pub current_rating: i64,
    #[serde(alias = "win_rate")]
    pub overall_win_rate: f64,
}

/// `GET /api/player-stats-snapshot`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotPage {
    #[serde(default)]
    pub players: Vec<SnapshotPlayer>,
    #[serde(default)]
    pub pagination: PaginationMeta,
}

/// Client for the board backend.
#[derive(Debug, Clone)]
pub struct BoardClient {
    client: Client,
    base_url: Url,
    max_content_size: usize,
}

impl BoardClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let mut base_url = Url::parse(&config.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(config.base_url));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("versus-board")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            max_content_size: config.max_content_size,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, url: Url) -> Result<Response, FetchError> {
        debug!("GET {}", url);

        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(FetchError::RateLimited {
                host: url.host_str().unwrap_or("unknown").to_string(),
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response)
    }

    async fn get_text(&self, url: Url) -> Result<String, FetchError> {
        let content = self.send(url).await?.bytes().await?;

        if content.len() > self.max_content_size {
            return Err(FetchError::ContentTooLarge {
                size: content.len(),
                max_size: self.max_content_size,
            });
        }

        Ok(String::from_utf8_lossy(&content).into_owned())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let text = self.get_text(url).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// List the available per-player CSV file names.
    pub async fn list_files(&self) -> Result<Vec<String>, FetchError> {
        let url = self.endpoint(&["api", "files"])?;
        let response: FilesResponse = self.get_json(url).await?;
        Ok(response.files)
    }

    /// Raw CSV text for one player.
    pub async fn player_csv(&self, id: &PlayerId) -> Result<String, FetchError> {
        let file = id.file_name();
        let url = self.endpoint(&["data", file.as_str()])?;
        self.get_text(url).await
    }

    /// Player code to display name mapping.
    pub async fn name_mapping(&self) -> Result<BTreeMap<PlayerId, String>, FetchError> {
        let url = self.endpoint(&["api", "player-names"])?;
        let response: NamesResponse = self.get_json(url).await?;
        Ok(response.name_mapping)
    }

    /// Newest-first daily snapshots for one player.
    pub async fn player_history(
        &self,
        id: &PlayerId,
        days: Option<u32>,
    ) -> Result<HistoryResponse, FetchError> {
        let mut url = self.endpoint(&["api", "player-history", id.as_str()])?;
        if let Some(days) = days {
            url.query_pairs_mut().append_pair("days", &days.to_string());
        }
        self.get_json(url).await
    }

    /// One page of the backend's ranked stats snapshot.
    pub async fn stats_snapshot(&self, params: &SnapshotParams) -> Result<SnapshotPage, FetchError> {
        let mut url = self.endpoint(&["api", "player-stats-snapshot"])?;
        let pairs = params.query_pairs();
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &pairs {
                query.append_pair(key, value);
            }
        }
        self.get_json(url).await
    }
}
