//! Upstream catalog provider seam.
//!
//! The gateway consumes the catalog only through [`CatalogProvider`] and
//! [`CatalogSession`]. The shipped adapter is [`InnertubeProvider`];
//! tests substitute in-memory mocks.

pub mod fetch;
pub mod innertube;
pub(crate) mod retry;
#[cfg(test)]
pub(crate) mod test_fixtures;
pub mod traits;
pub mod types;

use thiserror::Error;

pub use fetch::fetch_ranged;
pub use innertube::InnertubeProvider;
pub use traits::{CatalogProvider, CatalogSession, ClientHandle};
pub use types::{
    ByteStream, DownloadOptions, Playability, RawMediaInfo, RawResult, RawSection, SearchOptions,
    SessionOptions, UpstreamBody,
};

/// Errors raised by the upstream catalog or its transport.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The HTTP request itself failed (connect, TLS, body read, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog answered with a non-success status.
    #[error("HTTP error {0}: {1}")]
    HttpStatus(u16, String),

    /// The response did not have the expected shape.
    #[error("Failed to parse upstream response: {0}")]
    Parse(String),

    /// Session bootstrap values could not be obtained.
    #[error("Session bootstrap failed: {0}")]
    Bootstrap(String),
}

/// Convenient Result alias for upstream operations.
pub type UpstreamResult<T> = Result<T, UpstreamError>;

impl UpstreamError {
    /// Returns true if the session handle should be discarded.
    ///
    /// 401/403 from the catalog mean the session (API key, visitor data,
    /// or credential) is no longer accepted; retrying with the same
    /// handle cannot succeed.
    #[must_use]
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, UpstreamError::HttpStatus(401 | 403, _))
    }
}
