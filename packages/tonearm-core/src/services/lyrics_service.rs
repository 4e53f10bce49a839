//! Lyrics lookup with memoization and a hard deadline.
//!
//! On a cache miss the provider call races a timer. When the timer wins
//! the request future is dropped, which aborts the outbound HTTP call.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::BoundedCache;
use crate::error::{ErrorCode, GatewayError, GatewayResult};
use crate::lyrics::{LyricsHit, LyricsProvider};
use crate::protocol_constants::{DEFAULT_LYRICS_LIMIT, LYRICS_TIMEOUT_MESSAGE, MAX_LYRICS_LIMIT};

type LyricsKey = (String, usize);

pub struct LyricsService {
    provider: Arc<dyn LyricsProvider>,
    cache: BoundedCache<LyricsKey, Arc<Vec<LyricsHit>>>,
    cache_ttl: Duration,
    timeout: Duration,
}

impl LyricsService {
    pub fn new(
        provider: Arc<dyn LyricsProvider>,
        timeout: Duration,
        cache_ttl: Duration,
        cache_capacity: usize,
    ) -> Self {
        Self {
            provider,
            cache: BoundedCache::new(Some(cache_capacity)),
            cache_ttl,
            timeout,
        }
    }

    /// Looks up lyrics matches for `query`.
    ///
    /// `limit` defaults to 5 and is clamped to `1..=50`.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::BadRequest`] for a missing or blank query
    /// - [`GatewayError::Timeout`] when the provider misses the deadline
    /// - [`GatewayError::BadGateway`] / [`GatewayError::Upstream`] on provider failure
    pub async fn search(
        &self,
        query: Option<&str>,
        limit: Option<usize>,
    ) -> GatewayResult<Arc<Vec<LyricsHit>>> {
        let query = query.map(str::trim).unwrap_or_default();
        if query.is_empty() {
            return Err(GatewayError::BadRequest(
                "Missing query parameter: q".to_string(),
            ));
        }
        let limit = limit
            .unwrap_or(DEFAULT_LYRICS_LIMIT)
            .clamp(1, MAX_LYRICS_LIMIT);

        let key = (query.to_string(), limit);
        if let Some(hit) = self.cache.get(&key) {
            log::debug!("[Lyrics] Cache hit: q={:?}, limit={}", query, limit);
            return Ok(hit);
        }

        let hits = match tokio::time::timeout(self.timeout, self.provider.search(query, limit)).await
        {
            Ok(Ok(hits)) => Arc::new(hits),
            Ok(Err(e)) => {
                log::warn!("[Lyrics] Lookup failed ({}): q={:?}, {}", e.code(), query, e);
                return Err(e.into());
            }
            Err(_) => {
                log::warn!(
                    "[Lyrics] Lookup timed out after {}ms: q={:?}",
                    self.timeout.as_millis(),
                    query
                );
                return Err(GatewayError::Timeout(LYRICS_TIMEOUT_MESSAGE.to_string()));
            }
        };

        self.cache.put(key, Arc::clone(&hits), self.cache_ttl);
        Ok(hits)
    }

    /// Drops expired memoized results. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.cache.purge_expired()
    }
}
