//! Ranged HTTP fetch of a rendition URL.
//!
//! Shared by the InnerTube adapter's `download` and by the stream proxy
//! when a session only exposes URLs. The response body is never buffered;
//! it is handed back as a [`ByteStream`](super::ByteStream).

use futures::TryStreamExt;
use reqwest::header::{CONTENT_RANGE, RANGE};
use reqwest::{Client, StatusCode};

use super::types::UpstreamBody;
use super::{UpstreamError, UpstreamResult};

/// Opens `url`, forwarding `range` verbatim when present.
///
/// # Arguments
/// * `client` - The HTTP client to use for the request
/// * `url` - Rendition URL to fetch
/// * `range` - Raw `Range` header value from the inbound request
pub async fn fetch_ranged(
    client: &Client,
    url: &str,
    range: Option<&str>,
) -> UpstreamResult<UpstreamBody> {
    let mut request = client.get(url);
    if let Some(range) = range {
        request = request.header(RANGE, range);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::HttpStatus(
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown").to_string(),
        ));
    }

    let partial = status == StatusCode::PARTIAL_CONTENT;
    let content_range = response
        .headers()
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let content_length = response.content_length();

    log::debug!(
        "[Upstream] Rendition fetch opened: status={}, length={:?}, range={:?}",
        status,
        content_length,
        content_range
    );

    let stream = response.bytes_stream().map_err(std::io::Error::other);

    Ok(UpstreamBody {
        stream: Box::pin(stream),
        partial,
        content_length,
        content_range,
    })
}
