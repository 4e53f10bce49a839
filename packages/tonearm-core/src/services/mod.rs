//! Application services layer.
//!
//! This module contains the business logic services that orchestrate
//! between the API layer and infrastructure (upstream/, lyrics, stream/).

pub mod lyrics_service;
pub mod readiness;
pub mod search_service;
pub mod stream_proxy;

pub use lyrics_service::LyricsService;
pub use readiness::{ClientState, InitError, ReadinessManager};
pub use search_service::SearchService;
pub use stream_proxy::{AudioStream, StreamError, StreamProxy};
