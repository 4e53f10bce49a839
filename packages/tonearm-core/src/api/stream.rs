//! Audio streaming handlers.
//!
//! Separated from REST handlers due to their distinct concerns: range
//! forwarding, partial-content framing, and download naming. The body is
//! the relay stream itself, so hyper dropping the body on disconnect
//! cancels the upstream read.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};

use crate::api::AppState;
use crate::error::{GatewayError, GatewayResult};
use crate::services::AudioStream;
use crate::utils::{content_disposition, extension_for_mime, sanitize_filename};

pub(super) async fn stream_audio(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> GatewayResult<Response> {
    serve(&state, &id, &headers, false).await
}

pub(super) async fn download_audio(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> GatewayResult<Response> {
    serve(&state, &id, &headers, true).await
}

async fn serve(
    state: &AppState,
    id: &str,
    headers: &HeaderMap,
    attachment: bool,
) -> GatewayResult<Response> {
    let range = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
    log::debug!(
        "[Stream] {} requested: media={}, range={:?}",
        if attachment { "Download" } else { "Audio" },
        id,
        range
    );

    let audio = state.proxy.open_audio_stream(id, range).await?;
    build_response(audio, attachment)
}

fn build_response(audio: AudioStream, attachment: bool) -> GatewayResult<Response> {
    let status = if audio.partial {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, &audio.mime_type)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CACHE_CONTROL, "no-cache");

    if let Some(len) = audio.size_hint {
        builder = builder.header(header::CONTENT_LENGTH, len);
    }
    if let Some(range) = &audio.content_range {
        builder = builder.header(header::CONTENT_RANGE, range);
    }
    if attachment {
        let stem = sanitize_filename(audio.title.as_deref(), &audio.media_id);
        builder = builder.header(
            header::CONTENT_DISPOSITION,
            content_disposition(&stem, extension_for_mime(&audio.mime_type)),
        );
    }

    builder
        .body(Body::from_stream(audio.stream))
        .map_err(|e| GatewayError::Internal(e.to_string()))
}
