//! Trait abstractions for the upstream catalog.
//!
//! These traits enable dependency injection for testability. Services
//! depend on traits rather than on the concrete InnerTube adapter.

use std::sync::Arc;

use async_trait::async_trait;

use super::types::{
    DownloadOptions, RawMediaInfo, RawResult, SearchOptions, SessionOptions, UpstreamBody,
};
use super::UpstreamResult;

/// Shared handle to an initialized upstream session.
pub type ClientHandle = Arc<dyn CatalogSession>;

/// Factory for upstream sessions.
///
/// Used by `ReadinessManager`, which owns the session lifecycle.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Creates a new session.
    ///
    /// May fail transiently; the caller decides whether and when to retry.
    async fn initialize(&self, options: &SessionOptions) -> UpstreamResult<ClientHandle>;
}

/// Operations available on an initialized session.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait CatalogSession: Send + Sync {
    /// Runs a catalog search and returns the raw sections.
    async fn search(&self, query: &str, options: &SearchOptions) -> UpstreamResult<RawResult>;

    /// Fetches playability and renditions for a media id.
    async fn get_info(&self, id: &str) -> UpstreamResult<RawMediaInfo>;

    /// Opens a byte stream for a rendition of `info`.
    ///
    /// # Arguments
    /// * `info` - Media info previously returned by `get_info`
    /// * `options` - Selected rendition and optional `Range` to forward
    async fn download(
        &self,
        info: &RawMediaInfo,
        options: &DownloadOptions,
    ) -> UpstreamResult<UpstreamBody>;
}
