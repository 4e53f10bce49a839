//! HTTP API layer.
//!
//! This module contains thin handlers that delegate to services.
//! It provides the router construction and server startup functionality.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::services::{LyricsService, ReadinessManager, SearchService, StreamProxy};

pub mod http;
pub mod response;
mod stream;

/// Errors that can occur when starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to a TCP port.
    #[error("Failed to bind to port: {0}")]
    Bind(#[from] std::io::Error),
}

/// Shared application state for the API layer.
///
/// This is a thin wrapper that holds references to services.
/// All business logic lives in the services themselves.
#[derive(Clone)]
pub struct AppState {
    /// Owns the upstream session lifecycle.
    pub readiness: Arc<ReadinessManager>,
    /// Catalog search with memoization.
    pub search: Arc<SearchService>,
    /// Lyrics lookup with memoization and deadline.
    pub lyrics: Arc<LyricsService>,
    /// Audio stream resolution and relaying.
    pub proxy: Arc<StreamProxy>,
    /// Process start, for `/health` uptime.
    pub started_at: Instant,
}

/// Builder for constructing an `AppState`.
#[derive(Default)]
pub struct AppStateBuilder {
    readiness: Option<Arc<ReadinessManager>>,
    search: Option<Arc<SearchService>>,
    lyrics: Option<Arc<LyricsService>>,
    proxy: Option<Arc<StreamProxy>>,
    started_at: Option<Instant>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn readiness(mut self, readiness: Arc<ReadinessManager>) -> Self {
        self.readiness = Some(readiness);
        self
    }

    pub fn search(mut self, search: Arc<SearchService>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn lyrics(mut self, lyrics: Arc<LyricsService>) -> Self {
        self.lyrics = Some(lyrics);
        self
    }

    pub fn proxy(mut self, proxy: Arc<StreamProxy>) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Overrides the uptime reference (defaults to build time).
    pub fn started_at(mut self, started_at: Instant) -> Self {
        self.started_at = Some(started_at);
        self
    }

    /// Builds the `AppState`, panicking if required fields are missing.
    pub fn build(self) -> AppState {
        AppState {
            readiness: self.readiness.expect("readiness is required"),
            search: self.search.expect("search is required"),
            lyrics: self.lyrics.expect("lyrics is required"),
            proxy: self.proxy.expect("proxy is required"),
            started_at: self.started_at.unwrap_or_else(Instant::now),
        }
    }
}

impl AppState {
    /// Creates a new builder for constructing an `AppState`.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }
}

/// Binds the configured port (0 = OS-assigned).
pub async fn bind_listener(port: u16) -> Result<tokio::net::TcpListener, ServerError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    Ok(tokio::net::TcpListener::bind(&addr).await?)
}

/// Serves the API on `listener` until `shutdown` is cancelled.
///
/// In-flight requests (including audio relays) are allowed to finish;
/// relays observe client disconnects on their own.
pub async fn start_server(
    state: AppState,
    listener: tokio::net::TcpListener,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    let local_addr = listener.local_addr()?;
    log::info!("Server listening on http://{}", local_addr);

    let app = http::create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    log::info!("Server stopped");
    Ok(())
}
