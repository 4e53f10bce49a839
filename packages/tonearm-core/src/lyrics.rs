//! Lyrics search against LRCLIB.
//!
//! The service layer owns caching and the hard deadline; this module only
//! knows how to ask the provider and map its records.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the lyrics provider.
#[derive(Debug, Error)]
pub enum LyricsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("lyrics provider returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Failed to parse lyrics response: {0}")]
    Parse(String),
}

pub type LyricsResult<T> = Result<T, LyricsError>;

/// One lyrics search match as served by `/lyrics/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricsHit {
    pub id: u64,
    pub title: String,
    pub artists: String,
}

/// Source of lyrics search results.
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    /// Returns at most `limit` matches for `query`, in provider order.
    async fn search(&self, query: &str, limit: usize) -> LyricsResult<Vec<LyricsHit>>;
}

// ─────────────────────────────────────────────────────────────────────────────
// LRCLIB
// ─────────────────────────────────────────────────────────────────────────────

/// Raw LRCLIB search record. Older records use `name` instead of `trackName`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LrclibRecord {
    id: u64,
    #[serde(default)]
    track_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    artist_name: Option<String>,
}

impl From<LrclibRecord> for LyricsHit {
    fn from(record: LrclibRecord) -> Self {
        Self {
            id: record.id,
            title: record
                .track_name
                .filter(|t| !t.trim().is_empty())
                .or(record.name)
                .unwrap_or_default(),
            artists: record.artist_name.unwrap_or_default(),
        }
    }
}

/// LRCLIB `GET /api/search` client.
pub struct LrclibProvider {
    http: Client,
    base_url: String,
}

impl LrclibProvider {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl LyricsProvider for LrclibProvider {
    async fn search(&self, query: &str, limit: usize) -> LyricsResult<Vec<LyricsHit>> {
        let url = format!("{}/api/search", self.base_url);
        let response = self.http.get(&url).query(&[("q", query)]).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LyricsError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        parse_hits(&body, limit)
    }
}

fn parse_hits(body: &[u8], limit: usize) -> LyricsResult<Vec<LyricsHit>> {
    let records: Vec<LrclibRecord> =
        serde_json::from_slice(body).map_err(|e| LyricsError::Parse(e.to_string()))?;
    Ok(records.into_iter().take(limit).map(LyricsHit::from).collect())
}
