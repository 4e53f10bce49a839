//! Catalog search: readiness, upstream call, normalization, memoization.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::BoundedCache;
use crate::error::{ErrorCode, GatewayError, GatewayResult};
use crate::model::Track;
use crate::normalize::normalize;
use crate::services::readiness::ReadinessManager;
use crate::upstream::SearchOptions;

/// Cache key: lowercased, trimmed query plus the result cap.
type SearchKey = (String, usize);

pub struct SearchService {
    readiness: Arc<ReadinessManager>,
    cache: BoundedCache<SearchKey, Arc<Vec<Track>>>,
    cache_ttl: Duration,
    max_results: usize,
}

impl SearchService {
    pub fn new(
        readiness: Arc<ReadinessManager>,
        max_results: usize,
        cache_ttl: Duration,
        cache_capacity: usize,
    ) -> Self {
        Self {
            readiness,
            cache: BoundedCache::new(Some(cache_capacity)),
            cache_ttl,
            max_results,
        }
    }

    /// Searches the catalog and returns at most `max_results` tracks.
    ///
    /// A blank query yields an empty list without touching the upstream.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::NotReady`] if the upstream session cannot be established
    /// - [`GatewayError::Upstream`] if the search call fails
    pub async fn search(&self, query: &str) -> GatewayResult<Arc<Vec<Track>>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Arc::new(Vec::new()));
        }

        let key = (query.to_lowercase(), self.max_results);
        if let Some(hit) = self.cache.get(&key) {
            log::debug!("[Search] Cache hit: q={:?}", query);
            return Ok(hit);
        }

        let session = self.readiness.ready().await?;
        let raw = match session.search(query, &SearchOptions::default()).await {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("[Search] Upstream search failed ({}): q={:?}, {}", e.code(), query, e);
                if e.is_session_fatal() {
                    self.readiness.invalidate_if_current(&session, &e.to_string());
                }
                return Err(GatewayError::from(e));
            }
        };

        let tracks = Arc::new(normalize(&raw, self.max_results));
        log::debug!(
            "[Search] q={:?}: {} section(s) -> {} track(s)",
            query,
            raw.sections.len(),
            tracks.len()
        );

        self.cache.put(key, Arc::clone(&tracks), self.cache_ttl);
        Ok(tracks)
    }

    /// Drops expired memoized results. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.cache.purge_expired()
    }
}
