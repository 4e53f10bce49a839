//! Raw shapes exchanged with the upstream provider.
//!
//! Search items stay untyped (`serde_json::Value`) on purpose: their shape
//! varies per item kind and per catalog release, and only the normalizer's
//! adapter is allowed to interpret them.

use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::MediaRendition;

/// Boxed byte stream produced by the upstream or by a rendition fetch.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Options passed to `CatalogProvider::initialize`.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Optional session credential (cookie header value).
    pub cookie: Option<String>,
}

/// Options passed to `CatalogSession::search`.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Catalog-specific filter parameter (e.g. songs only).
    pub filter: Option<String>,
}

/// A search response: an ordered list of heterogeneous sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawResult {
    pub sections: Vec<RawSection>,
}

/// One section of a search response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSection {
    pub title: Option<String>,
    pub items: Option<Vec<Value>>,
}

/// Playability verdict attached to media info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playability {
    pub status: String,
    pub reason: Option<String>,
}

/// Statuses meaning "exists, but policy forbids playback for this caller".
const RESTRICTED_STATUSES: [&str; 5] = [
    "LOGIN_REQUIRED",
    "AGE_CHECK_REQUIRED",
    "AGE_VERIFICATION_REQUIRED",
    "CONTENT_CHECK_REQUIRED",
    "UNPLAYABLE",
];

impl Playability {
    pub fn new(status: impl Into<String>, reason: Option<String>) -> Self {
        Self {
            status: status.into(),
            reason,
        }
    }

    /// Returns true if playback is restricted by upstream policy.
    pub fn is_restricted(&self) -> bool {
        RESTRICTED_STATUSES.contains(&self.status.as_str())
    }

    /// Returns true if the catalog reports the media as missing.
    pub fn is_missing(&self) -> bool {
        self.status == "ERROR"
    }

    /// Human-readable explanation, falling back to the raw status.
    pub fn describe(&self) -> String {
        self.reason
            .clone()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| self.status.clone())
    }
}

/// Media info as returned by `CatalogSession::get_info`.
#[derive(Debug, Clone, Default)]
pub struct RawMediaInfo {
    pub id: String,
    pub title: Option<String>,
    pub playability: Option<Playability>,
    pub renditions: Vec<MediaRendition>,
    /// True when the session can stream bytes itself via `download`.
    ///
    /// When false the caller fetches the selected rendition URL directly.
    pub direct_stream: bool,
}

/// Options passed to `CatalogSession::download`.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// The rendition chosen by the caller.
    pub rendition: MediaRendition,
    /// Raw `Range` header value to forward, if any.
    pub range: Option<String>,
}

/// An opened upstream body plus the framing headers worth forwarding.
pub struct UpstreamBody {
    pub stream: ByteStream,
    /// True when the upstream served a sub-range (206).
    pub partial: bool,
    pub content_length: Option<u64>,
    pub content_range: Option<String>,
}

impl std::fmt::Debug for UpstreamBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamBody")
            .field("partial", &self.partial)
            .field("content_length", &self.content_length)
            .field("content_range", &self.content_range)
            .finish_non_exhaustive()
    }
}
