//! Core configuration types.
//!
//! [`Config`] holds every tunable of the gateway. The server binary builds
//! it from YAML, environment, and CLI flags; tests build it directly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::protocol_constants::{
    DEFAULT_INIT_ATTEMPTS, DEFAULT_INIT_BACKOFF_MS, DEFAULT_LYRICS_TIMEOUT_MS,
    DEFAULT_MAX_RESULTS, DEFAULT_PORT, DEFAULT_RELAY_BUFFER_CHUNKS,
    DEFAULT_UPSTREAM_TIMEOUT_SECS, LRCLIB_BASE_URL, MAX_CACHE_TTL_SECS,
};

/// Retry policy for upstream session initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitPolicy {
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl Default for InitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_INIT_ATTEMPTS,
            backoff_ms: DEFAULT_INIT_BACKOFF_MS,
        }
    }
}

/// Configuration for the Tonearm gateway.
///
/// All fields have sensible defaults.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    // Server
    /// Port for the HTTP server (0 = auto-allocate).
    pub preferred_port: u16,

    // Search
    /// Maximum tracks returned by `/search`.
    pub max_results: usize,

    /// Search result TTL (seconds). 0 disables search caching.
    pub search_cache_ttl_secs: u64,

    /// Maximum cached search queries.
    pub search_cache_capacity: usize,

    // Upstream
    /// Initialization attempts before reporting not-ready.
    pub init_max_attempts: u32,

    /// Base delay between initialization attempts (milliseconds).
    pub init_backoff_ms: u64,

    /// Timeout for catalog API calls (seconds). Not applied to audio relays.
    pub upstream_timeout_secs: u64,

    /// Optional session credential forwarded as the upstream cookie.
    #[serde(skip_serializing)]
    pub upstream_cookie: Option<String>,

    // Streaming
    /// Chunks buffered between the upstream reader and the client.
    pub relay_buffer_chunks: usize,

    // Lyrics
    /// Lyrics provider base URL.
    pub lyrics_base_url: String,

    /// Hard deadline for a lyrics lookup (milliseconds).
    pub lyrics_timeout_ms: u64,

    /// Lyrics result TTL (seconds).
    pub lyrics_cache_ttl_secs: u64,

    /// Maximum cached lyrics lookups.
    pub lyrics_cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preferred_port: DEFAULT_PORT,
            max_results: DEFAULT_MAX_RESULTS,
            search_cache_ttl_secs: 60,
            search_cache_capacity: 128,
            init_max_attempts: DEFAULT_INIT_ATTEMPTS,
            init_backoff_ms: DEFAULT_INIT_BACKOFF_MS,
            upstream_timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            upstream_cookie: None,
            relay_buffer_chunks: DEFAULT_RELAY_BUFFER_CHUNKS,
            lyrics_base_url: LRCLIB_BASE_URL.to_string(),
            lyrics_timeout_ms: DEFAULT_LYRICS_TIMEOUT_MS,
            lyrics_cache_ttl_secs: 600,
            lyrics_cache_capacity: 256,
        }
    }
}

impl Config {
    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_results == 0 {
            return Err("max_results must be >= 1".to_string());
        }
        if self.init_max_attempts == 0 {
            return Err("init_max_attempts must be >= 1".to_string());
        }
        if self.relay_buffer_chunks == 0 {
            return Err("relay_buffer_chunks must be >= 1 (mpsc::channel panics on 0)".to_string());
        }
        if self.lyrics_timeout_ms == 0 {
            return Err("lyrics_timeout_ms must be >= 1".to_string());
        }
        if self.upstream_timeout_secs == 0 {
            return Err("upstream_timeout_secs must be >= 1".to_string());
        }
        if self.search_cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(format!(
                "search_cache_ttl_secs must be <= {}",
                MAX_CACHE_TTL_SECS
            ));
        }
        if self.lyrics_cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(format!(
                "lyrics_cache_ttl_secs must be <= {}",
                MAX_CACHE_TTL_SECS
            ));
        }
        if !self.lyrics_base_url.starts_with("http://") && !self.lyrics_base_url.starts_with("https://")
        {
            return Err(format!(
                "lyrics_base_url must be an http(s) URL, got {:?}",
                self.lyrics_base_url
            ));
        }
        Ok(())
    }

    pub fn init_policy(&self) -> InitPolicy {
        InitPolicy {
            max_attempts: self.init_max_attempts,
            backoff_ms: self.init_backoff_ms,
        }
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn lyrics_timeout(&self) -> Duration {
        Duration::from_millis(self.lyrics_timeout_ms)
    }

    pub fn lyrics_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.lyrics_cache_ttl_secs)
    }

    pub fn search_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.search_cache_ttl_secs)
    }
}
