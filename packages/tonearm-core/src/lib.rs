//! Tonearm Core - shared library for the Tonearm gateway.
//!
//! Tonearm sits in front of an unstable third-party music catalog and
//! exposes a small, stable HTTP surface: search, audio streaming and
//! download, lyrics lookup, and health. The catalog's schema drifts and
//! its sessions expire; this crate absorbs both so clients see one shape.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`upstream`]: Catalog provider seam and the InnerTube adapter
//! - [`normalize`]: Drift-tolerant translation of raw results into [`Track`]s
//! - [`select`]: Thumbnail and audio rendition ranking
//! - [`services`]: Readiness, search, lyrics, and stream proxy services
//! - [`stream`]: Bounded byte relay with disconnect cancellation
//! - [`cache`]: Bounded TTL cache used for memoization
//! - [`api`]: Axum router and thin handlers
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! - [`CatalogProvider`](upstream::CatalogProvider) /
//!   [`CatalogSession`](upstream::CatalogSession): the music catalog
//! - [`LyricsProvider`](lyrics::LyricsProvider): the lyrics service
//!
//! Each has a live implementation wired by [`bootstrap`]; tests substitute
//! in-memory doubles.

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod bootstrap;
pub mod cache;
pub mod error;
pub mod lyrics;
pub mod model;
pub mod normalize;
pub mod protocol_constants;
pub mod select;
pub mod services;
pub mod state;
pub mod stream;
pub mod upstream;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export commonly used types at the crate root
pub use cache::BoundedCache;
pub use error::{ErrorCode, GatewayError, GatewayResult};
pub use model::{MediaRendition, Thumbnail, Track};
pub use normalize::normalize;
pub use select::{best_audio, best_thumbnail};
pub use state::{Config, InitPolicy};

// Re-export service types
pub use services::{
    AudioStream, ClientState, InitError, LyricsService, ReadinessManager, SearchService,
    StreamError, StreamProxy,
};

// Re-export provider seams
pub use lyrics::{LrclibProvider, LyricsHit, LyricsProvider};
pub use upstream::{CatalogProvider, CatalogSession, InnertubeProvider, UpstreamError};

// Re-export bootstrap types
pub use bootstrap::{bootstrap_services, bootstrap_with_providers, BootstrappedServices};

// Re-export API types
pub use api::{bind_listener, start_server, AppState, AppStateBuilder, ServerError};
