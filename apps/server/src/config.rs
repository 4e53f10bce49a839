//! Server configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tonearm_core::protocol_constants::DEFAULT_PORT;

/// Server configuration loaded from YAML with environment overrides.
///
/// Fields left out of the file keep the core defaults.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to bind the HTTP server to (0 = OS-assigned).
    /// Override: `PORT`
    pub port: u16,

    /// Maximum tracks returned by one search.
    pub max_results: usize,

    /// Seconds a search result stays memoized (0 disables).
    pub search_cache_ttl_secs: u64,

    /// Attempts per upstream initialization round.
    /// Override: `TONEARM_INIT_MAX_ATTEMPTS`
    pub init_max_attempts: u32,

    /// Linear backoff base between initialization attempts.
    pub init_backoff_ms: u64,

    /// Timeout for upstream JSON calls.
    pub upstream_timeout_secs: u64,

    /// Session credential presented to the catalog.
    /// Override: `TONEARM_UPSTREAM_COOKIE`
    pub upstream_cookie: Option<String>,

    /// Lyrics service base URL.
    /// Override: `TONEARM_LYRICS_URL`
    pub lyrics_base_url: Option<String>,

    /// Deadline for one lyrics lookup.
    pub lyrics_timeout_ms: u64,

    /// Chunks buffered per audio relay.
    pub relay_buffer_chunks: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let core = tonearm_core::Config::default();
        Self {
            port: DEFAULT_PORT,
            max_results: core.max_results,
            search_cache_ttl_secs: core.search_cache_ttl_secs,
            init_max_attempts: core.init_max_attempts,
            init_backoff_ms: core.init_backoff_ms,
            upstream_timeout_secs: core.upstream_timeout_secs,
            upstream_cookie: None,
            lyrics_base_url: None,
            lyrics_timeout_ms: core.lyrics_timeout_ms,
            relay_buffer_chunks: core.relay_buffer_chunks,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Applies environment variable overrides to the configuration.
    ///
    /// Unparseable values are ignored, so a malformed `PORT` keeps the file
    /// or default port. `--port` on the command line still wins.
    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(port) = var("PORT").and_then(|v| v.parse().ok()) {
            self.port = port;
        }

        if let Some(attempts) = var("TONEARM_INIT_MAX_ATTEMPTS").and_then(|v| v.parse().ok()) {
            self.init_max_attempts = attempts;
        }

        if let Some(cookie) = var("TONEARM_UPSTREAM_COOKIE").filter(|v| !v.trim().is_empty()) {
            self.upstream_cookie = Some(cookie);
        }

        if let Some(url) = var("TONEARM_LYRICS_URL").filter(|v| !v.trim().is_empty()) {
            self.lyrics_base_url = Some(url);
        }
    }

    /// Converts to tonearm-core's Config type.
    pub fn to_core_config(&self) -> tonearm_core::Config {
        let defaults = tonearm_core::Config::default();
        tonearm_core::Config {
            preferred_port: self.port,
            max_results: self.max_results,
            search_cache_ttl_secs: self.search_cache_ttl_secs,
            init_max_attempts: self.init_max_attempts,
            init_backoff_ms: self.init_backoff_ms,
            upstream_timeout_secs: self.upstream_timeout_secs,
            upstream_cookie: self.upstream_cookie.clone(),
            relay_buffer_chunks: self.relay_buffer_chunks,
            lyrics_base_url: self
                .lyrics_base_url
                .clone()
                .unwrap_or(defaults.lyrics_base_url.clone()),
            lyrics_timeout_ms: self.lyrics_timeout_ms,
            ..defaults
        }
    }
}
