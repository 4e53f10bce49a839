//! Resolves a media id to an audio byte stream.
//!
//! Flow: readiness, media info, playability check, rendition selection,
//! then either the session's own download or a ranged fetch of the
//! rendition URL. The body is handed to a bounded relay, so nothing is
//! buffered beyond the relay's capacity and a client disconnect cancels
//! the upstream read.

use std::sync::Arc;

use reqwest::Client;
use thiserror::Error;

use crate::error::ErrorCode;
use crate::model::MediaRendition;
use crate::select::best_audio;
use crate::services::readiness::{InitError, ReadinessManager};
use crate::stream::{spawn_relay, RelayStream};
use crate::upstream::{fetch_ranged, ClientHandle, DownloadOptions, UpstreamError};

/// Errors opening an audio stream.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error(transparent)]
    NotReady(#[from] InitError),

    /// Playback is restricted by upstream policy (e.g. sign-in required).
    #[error("{0}")]
    Forbidden(String),

    /// No rendition qualifies as playable audio.
    #[error("no audio available for {0}")]
    NoAudio(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// An opened audio stream plus the framing a response needs.
#[derive(Debug)]
pub struct AudioStream {
    pub stream: RelayStream,
    pub media_id: String,
    pub title: Option<String>,
    pub mime_type: String,
    /// Length of the body being served, if known.
    pub size_hint: Option<u64>,
    /// True when a sub-range is being served (206).
    pub partial: bool,
    pub content_range: Option<String>,
}

pub struct StreamProxy {
    readiness: Arc<ReadinessManager>,
    http: Client,
    relay_capacity: usize,
}

impl StreamProxy {
    pub fn new(readiness: Arc<ReadinessManager>, http: Client, relay_capacity: usize) -> Self {
        Self {
            readiness,
            http,
            relay_capacity,
        }
    }

    /// Opens the best audio rendition of `media_id`.
    ///
    /// # Arguments
    /// * `media_id` - Catalog media identifier
    /// * `range` - Inbound `Range` header, forwarded verbatim
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Forbidden`] for restricted media and
    /// [`StreamError::NoAudio`] when nothing playable exists. In the latter
    /// case no byte fetch is attempted.
    pub async fn open_audio_stream(
        &self,
        media_id: &str,
        range: Option<&str>,
    ) -> Result<AudioStream, StreamError> {
        let session = self.readiness.ready().await?;

        let info = session
            .get_info(media_id)
            .await
            .map_err(|e| self.on_upstream_error(&session, media_id, e))?;

        if let Some(playability) = &info.playability {
            if playability.is_restricted() {
                log::info!(
                    "[Stream] Playback restricted: media={}, status={}",
                    media_id,
                    playability.status
                );
                return Err(StreamError::Forbidden(playability.describe()));
            }
            if playability.is_missing() {
                return Err(StreamError::NoAudio(media_id.to_string()));
            }
        }

        let rendition = best_audio(&info.renditions)
            .cloned()
            .ok_or_else(|| StreamError::NoAudio(media_id.to_string()))?;
        log_selection(media_id, &rendition, info.renditions.len());

        let body = if info.direct_stream {
            let options = DownloadOptions {
                rendition: rendition.clone(),
                range: range.map(str::to_string),
            };
            session.download(&info, &options).await
        } else {
            // best_audio only selects renditions with a URL.
            let url = rendition.fetch_url().unwrap_or_default();
            fetch_ranged(&self.http, url, range).await
        }
        .map_err(|e| self.on_upstream_error(&session, media_id, e))?;

        Ok(AudioStream {
            stream: spawn_relay(body.stream, self.relay_capacity, media_id),
            media_id: media_id.to_string(),
            title: info.title.clone(),
            mime_type: rendition.mime_type.clone(),
            size_hint: body
                .content_length
                .or(if body.partial { None } else { rendition.content_length }),
            partial: body.partial,
            content_range: body.content_range,
        })
    }

    fn on_upstream_error(
        &self,
        session: &ClientHandle,
        media_id: &str,
        err: UpstreamError,
    ) -> StreamError {
        log::warn!(
            "[Stream] Upstream failure ({}): media={}, {}",
            err.code(),
            media_id,
            err
        );
        if err.is_session_fatal() {
            self.readiness.invalidate_if_current(session, &err.to_string());
        }
        StreamError::Upstream(err)
    }
}

fn log_selection(media_id: &str, rendition: &MediaRendition, candidates: usize) {
    log::debug!(
        "[Stream] Selected rendition: media={}, mime={}, bitrate={:?}, candidates={}",
        media_id,
        rendition.mime_type,
        rendition.bitrate_bps,
        candidates
    );
}
