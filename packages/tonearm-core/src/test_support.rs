//! In-memory doubles for the upstream and lyrics seams.
//!
//! Shared by service and HTTP tests so each scenario only states what
//! differs from a healthy catalog.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::json;

use crate::lyrics::{LyricsError, LyricsHit, LyricsProvider, LyricsResult};
use crate::model::MediaRendition;
use crate::upstream::{
    ByteStream, CatalogProvider, CatalogSession, ClientHandle, DownloadOptions, Playability,
    RawMediaInfo, RawResult, RawSection, SearchOptions, SessionOptions, UpstreamBody,
    UpstreamError, UpstreamResult,
};

// ─────────────────────────────────────────────────────────────────────────────
// Catalog Session
// ─────────────────────────────────────────────────────────────────────────────

pub struct MockSession {
    pub sections: Vec<RawSection>,
    pub search_status: Option<u16>,
    pub info: Option<RawMediaInfo>,
    pub info_status: Option<u16>,
    pub body: Vec<Bytes>,
    /// Keep the body open after the last chunk.
    pub endless: bool,
    pub search_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
    pub last_range: parking_lot::Mutex<Option<String>>,
    pub source_dropped: Arc<AtomicBool>,
}

impl Default for MockSession {
    fn default() -> Self {
        Self {
            sections: Vec::new(),
            search_status: None,
            info: None,
            info_status: None,
            body: vec![Bytes::from_static(b"abcd"), Bytes::from_static(b"efgh")],
            endless: false,
            search_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
            last_range: parking_lot::Mutex::new(None),
            source_dropped: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl MockSession {
    /// A session whose search returns one section of simple song items.
    pub fn with_songs(ids: &[&str]) -> Self {
        let items = ids
            .iter()
            .map(|id| json!({ "videoId": id, "title": format!("Song {id}"), "artists": [{ "name": "Artist" }] }))
            .collect();
        Self {
            sections: vec![RawSection {
                title: Some("Songs".into()),
                items: Some(items),
            }],
            ..Self::default()
        }
    }

    /// A session whose `get_info` returns `info`, streamed by the session itself.
    pub fn with_media(info: RawMediaInfo) -> Self {
        Self {
            info: Some(info),
            ..Self::default()
        }
    }

    pub fn searches(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }
}

/// Playable media with one audio rendition, streamed directly by the session.
pub fn playable_media(id: &str) -> RawMediaInfo {
    RawMediaInfo {
        id: id.to_string(),
        title: Some("My Song: Live/Remix".into()),
        playability: Some(Playability::new("OK", None)),
        renditions: vec![
            MediaRendition {
                mime_type: "video/mp4".into(),
                bitrate_bps: Some(900_000),
                url: Some("https://media.example/video".into()),
                ..MediaRendition::default()
            },
            MediaRendition {
                mime_type: "audio/webm; codecs=\"opus\"".into(),
                bitrate_bps: Some(160_000),
                url: Some("https://media.example/opus".into()),
                content_length: Some(8),
                ..MediaRendition::default()
            },
        ],
        direct_stream: true,
    }
}

/// Stream wrapper that flags when the upstream body is dropped.
struct TrackedBody {
    inner: ByteStream,
    dropped: Arc<AtomicBool>,
}

impl Stream for TrackedBody {
    type Item = Result<Bytes, std::io::Error>;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl Drop for TrackedBody {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogSession for MockSession {
    async fn search(&self, _query: &str, _options: &SearchOptions) -> UpstreamResult<RawResult> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.search_status {
            return Err(UpstreamError::HttpStatus(status, "mock".into()));
        }
        Ok(RawResult {
            sections: self.sections.clone(),
        })
    }

    async fn get_info(&self, id: &str) -> UpstreamResult<RawMediaInfo> {
        if let Some(status) = self.info_status {
            return Err(UpstreamError::HttpStatus(status, "mock".into()));
        }
        match &self.info {
            Some(info) => Ok(RawMediaInfo {
                id: id.to_string(),
                ..info.clone()
            }),
            None => Err(UpstreamError::Parse(format!("no media {id}"))),
        }
    }

    async fn download(
        &self,
        _info: &RawMediaInfo,
        options: &DownloadOptions,
    ) -> UpstreamResult<UpstreamBody> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_range.lock() = options.range.clone();

        let chunks: Vec<Result<Bytes, std::io::Error>> =
            self.body.iter().cloned().map(Ok).collect();
        let total: u64 = self.body.iter().map(|c| c.len() as u64).sum();
        let inner: ByteStream = if self.endless {
            Box::pin(futures::stream::iter(chunks).chain(futures::stream::pending()))
        } else {
            Box::pin(futures::stream::iter(chunks))
        };

        let partial = options.range.is_some();
        Ok(UpstreamBody {
            stream: Box::pin(TrackedBody {
                inner,
                dropped: Arc::clone(&self.source_dropped),
            }),
            partial,
            content_length: Some(total),
            content_range: partial.then(|| format!("bytes 0-{}/{}", total - 1, total * 2)),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog Provider
// ─────────────────────────────────────────────────────────────────────────────

pub struct MockProvider {
    session: Arc<MockSession>,
    failures_left: AtomicU32,
    delay: Duration,
    hang: bool,
    calls: AtomicU32,
}

impl MockProvider {
    pub fn new(session: Arc<MockSession>) -> Self {
        Self {
            session,
            failures_left: AtomicU32::new(0),
            delay: Duration::ZERO,
            hang: false,
            calls: AtomicU32::new(0),
        }
    }

    /// Fails the first `n` initializations with a 503.
    pub fn failing(self, n: u32) -> Self {
        self.failures_left.store(n, Ordering::SeqCst);
        self
    }

    pub fn always_failing(self) -> Self {
        self.failing(u32::MAX)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Never completes an initialization.
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogProvider for MockProvider {
    async fn initialize(&self, _options: &SessionOptions) -> UpstreamResult<ClientHandle> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.hang {
            futures::future::pending::<()>().await;
        }
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(UpstreamError::HttpStatus(503, "Service Unavailable".into()));
        }
        Ok(self.session.clone() as ClientHandle)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lyrics
// ─────────────────────────────────────────────────────────────────────────────

pub enum LyricsBehavior {
    Hits(Vec<LyricsHit>),
    Status(u16),
    Hang,
}

pub struct MockLyrics {
    behavior: LyricsBehavior,
    calls: AtomicUsize,
    pub cancelled: Arc<AtomicBool>,
}

impl MockLyrics {
    pub fn new(behavior: LyricsBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn hits(n: u64) -> Self {
        Self::new(LyricsBehavior::Hits(
            (1..=n)
                .map(|id| LyricsHit {
                    id,
                    title: format!("Title {id}"),
                    artists: "Artist".into(),
                })
                .collect(),
        ))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Sets its flag when dropped before being disarmed.
struct CancelFlag(Arc<AtomicBool>);

impl Drop for CancelFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl LyricsProvider for MockLyrics {
    async fn search(&self, _query: &str, limit: usize) -> LyricsResult<Vec<LyricsHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            LyricsBehavior::Hits(hits) => Ok(hits.iter().take(limit).cloned().collect()),
            LyricsBehavior::Status(status) => Err(LyricsError::HttpStatus(*status)),
            LyricsBehavior::Hang => {
                let _flag = CancelFlag(Arc::clone(&self.cancelled));
                futures::future::pending::<()>().await;
                unreachable!("pending never resolves")
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendition Host
// ─────────────────────────────────────────────────────────────────────────────

/// Local HTTP host serving one rendition at `url`, honoring `Range`.
///
/// Stops when dropped.
pub struct RenditionHost {
    pub url: String,
    pub base: String,
    pub last_range: Arc<parking_lot::Mutex<Option<String>>>,
    _shutdown: tokio_util::sync::DropGuard,
}

pub async fn serve_rendition(body: &'static [u8]) -> RenditionHost {
    use axum::http::HeaderMap;
    use axum::routing::get;

    let last_range = Arc::new(parking_lot::Mutex::new(None));
    let recorded = Arc::clone(&last_range);
    let router = axum::Router::new().route(
        "/rendition",
        get(move |headers: HeaderMap| {
            let recorded = Arc::clone(&recorded);
            async move { ranged_response(body, &headers, &recorded) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let token = tokio_util::sync::CancellationToken::new();
    let shutdown = token.clone();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await;
    });

    RenditionHost {
        url: format!("{}/rendition", base),
        base,
        last_range,
        _shutdown: token.drop_guard(),
    }
}

/// Client for talking to a [`RenditionHost`] without any configured proxy.
pub fn local_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

fn ranged_response(
    body: &'static [u8],
    headers: &axum::http::HeaderMap,
    recorded: &parking_lot::Mutex<Option<String>>,
) -> axum::response::Response {
    use axum::http::header::{CONTENT_RANGE, RANGE};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    let range = headers
        .get(RANGE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *recorded.lock() = range.clone();

    let total = body.len();
    let bounds = range.as_deref().and_then(|r| {
        let (start, end) = r.strip_prefix("bytes=")?.split_once('-')?;
        let start: usize = start.parse().ok()?;
        let end = match end {
            "" => total - 1,
            end => end.parse::<usize>().ok()?.min(total - 1),
        };
        (start <= end).then_some((start, end))
    });

    match bounds {
        Some((start, end)) => (
            StatusCode::PARTIAL_CONTENT,
            [(CONTENT_RANGE, format!("bytes {}-{}/{}", start, end, total))],
            &body[start..=end],
        )
            .into_response(),
        None => (StatusCode::OK, body).into_response(),
    }
}
