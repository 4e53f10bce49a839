//! Application bootstrap and dependency wiring.
//!
//! This module contains the composition root - the single place where all
//! services are instantiated and wired together. Providers are injected as
//! trait objects so tests can run the full service graph without network.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::api::AppState;
use crate::error::{GatewayError, GatewayResult};
use crate::lyrics::{LrclibProvider, LyricsProvider};
use crate::protocol_constants::{BROWSER_USER_AGENT, CONNECT_TIMEOUT_SECS};
use crate::services::{LyricsService, ReadinessManager, SearchService, StreamProxy};
use crate::state::Config;
use crate::upstream::{CatalogProvider, InnertubeProvider, SessionOptions};

/// How often expired cache entries are swept.
const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Container for all bootstrapped services.
///
/// It's consumed by `AppState` to build the final application state.
#[derive(Clone)]
pub struct BootstrappedServices {
    /// Owns the upstream session lifecycle.
    pub readiness: Arc<ReadinessManager>,
    pub search: Arc<SearchService>,
    pub lyrics: Arc<LyricsService>,
    pub proxy: Arc<StreamProxy>,
    /// Cancellation token for graceful shutdown.
    pub cancel_token: CancellationToken,
    started_at: Instant,
}

impl BootstrappedServices {
    /// Builds the API state over these services.
    pub fn app_state(&self) -> AppState {
        AppState::builder()
            .readiness(Arc::clone(&self.readiness))
            .search(Arc::clone(&self.search))
            .lyrics(Arc::clone(&self.lyrics))
            .proxy(Arc::clone(&self.proxy))
            .started_at(self.started_at)
            .build()
    }

    /// Starts the upstream warm-up and the periodic cache sweep.
    ///
    /// Warm-up failure is logged only; the next request retries
    /// initialization on demand.
    pub fn start_background_tasks(&self) {
        let readiness = Arc::clone(&self.readiness);
        let cancel = self.cancel_token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                result = readiness.ready() => match result {
                    Ok(_) => log::info!("[Bootstrap] Upstream warm-up complete"),
                    Err(e) => log::warn!("[Bootstrap] Upstream warm-up failed: {}", e),
                },
            }
        });

        let search = Arc::clone(&self.search);
        let lyrics = Arc::clone(&self.lyrics);
        let cancel = self.cancel_token.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CACHE_PURGE_INTERVAL);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        let purged = search.purge_expired() + lyrics.purge_expired();
                        if purged > 0 {
                            log::debug!("[Bootstrap] Purged {} expired cache entries", purged);
                        }
                    }
                }
            }
        });
    }

    /// Initiates graceful shutdown of all services.
    pub fn shutdown(&self) {
        log::info!("[Bootstrap] Beginning graceful shutdown...");
        self.cancel_token.cancel();
        self.readiness.invalidate("shutting down");
        log::info!("[Bootstrap] Shutdown complete");
    }
}

/// Creates the shared HTTP client for all outbound calls.
///
/// Only a connect timeout is set here: audio relays are long-lived, so
/// request deadlines are applied per call by the upstream adapters.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn create_http_client() -> GatewayResult<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .user_agent(BROWSER_USER_AGENT)
        .build()
        .map_err(|e| GatewayError::Internal(format!("Failed to create HTTP client: {}", e)))
}

/// Bootstraps all application services against the live providers.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the HTTP client
/// cannot be built.
pub fn bootstrap_services(config: &Config) -> GatewayResult<BootstrappedServices> {
    let http_client = create_http_client()?;

    let catalog = Arc::new(InnertubeProvider::new(
        http_client.clone(),
        config.upstream_timeout(),
    ));
    let lyrics = Arc::new(LrclibProvider::new(
        http_client.clone(),
        config.lyrics_base_url.clone(),
    ));

    bootstrap_with_providers(config, http_client, catalog, lyrics)
}

/// Wires the service graph over the given providers.
///
/// The wiring order follows dependencies:
///
/// 1. Readiness manager (owns the catalog provider)
/// 2. Search service and stream proxy (depend on readiness)
/// 3. Lyrics service (independent of the catalog)
///
/// # Errors
///
/// Returns [`GatewayError::BadRequest`] if `config` fails validation.
pub fn bootstrap_with_providers(
    config: &Config,
    http_client: Client,
    catalog: Arc<dyn CatalogProvider>,
    lyrics_provider: Arc<dyn LyricsProvider>,
) -> GatewayResult<BootstrappedServices> {
    config
        .validate()
        .map_err(|e| GatewayError::BadRequest(format!("Invalid configuration: {}", e)))?;

    let options = SessionOptions {
        cookie: config.upstream_cookie.clone(),
    };
    let readiness = Arc::new(ReadinessManager::new(
        catalog,
        options,
        config.init_policy(),
    ));

    let search = Arc::new(SearchService::new(
        Arc::clone(&readiness),
        config.max_results,
        config.search_cache_ttl(),
        config.search_cache_capacity,
    ));
    let proxy = Arc::new(StreamProxy::new(
        Arc::clone(&readiness),
        http_client,
        config.relay_buffer_chunks,
    ));
    let lyrics = Arc::new(LyricsService::new(
        lyrics_provider,
        config.lyrics_timeout(),
        config.lyrics_cache_ttl(),
        config.lyrics_cache_capacity,
    ));

    log::info!(
        "[Bootstrap] Services wired: max_results={}, relay_buffer={} chunk(s)",
        config.max_results,
        config.relay_buffer_chunks
    );

    Ok(BootstrappedServices {
        readiness,
        search,
        lyrics,
        proxy,
        cancel_token: CancellationToken::new(),
        started_at: Instant::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ClientState;
    use crate::test_support::{MockLyrics, MockProvider, MockSession};

    fn services(provider: MockProvider) -> BootstrappedServices {
        bootstrap_with_providers(
            &Config::default(),
            Client::new(),
            Arc::new(provider),
            Arc::new(MockLyrics::hits(1)),
        )
        .unwrap()
    }

    #[test]
    fn http_client_builds() {
        let client = create_http_client().unwrap();
        assert!(client.get("http://example.com").build().is_ok());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = Config {
            relay_buffer_chunks: 0,
            ..Config::default()
        };
        let result = bootstrap_with_providers(
            &config,
            Client::new(),
            Arc::new(MockProvider::new(Arc::new(MockSession::default()))),
            Arc::new(MockLyrics::hits(1)),
        );
        assert!(matches!(result, Err(GatewayError::BadRequest(_))));
    }

    #[tokio::test]
    async fn warm_up_initializes_upstream() {
        let services = services(MockProvider::new(Arc::new(MockSession::default())));
        services.start_background_tasks();

        tokio::time::timeout(Duration::from_secs(1), async {
            while !services.readiness.is_ready() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("warm-up never completed");

        services.shutdown();
        assert_eq!(services.readiness.state(), ClientState::Uninitialized);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_pending_warm_up() {
        let session = Arc::new(MockSession::default());
        let services = services(MockProvider::new(session).hanging());
        services.start_background_tasks();
        while services.readiness.state() != ClientState::Initializing {
            tokio::task::yield_now().await;
        }

        services.shutdown();
        assert!(services.cancel_token.is_cancelled());
        tokio::time::timeout(Duration::from_secs(1), async {
            while services.readiness.state() != ClientState::Uninitialized {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("warm-up was not abandoned");
    }

    #[tokio::test]
    async fn app_state_shares_services() {
        let services = services(MockProvider::new(Arc::new(MockSession::default())));
        let state = services.app_state();
        assert!(Arc::ptr_eq(&state.readiness, &services.readiness));
        assert!(Arc::ptr_eq(&state.proxy, &services.proxy));
        assert!(Arc::ptr_eq(&state.search, &services.search));
        assert!(Arc::ptr_eq(&state.lyrics, &services.lyrics));
    }
}
