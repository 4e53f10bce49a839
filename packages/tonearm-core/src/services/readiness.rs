//! Upstream session lifecycle.
//!
//! [`ReadinessManager`] owns the single process-wide [`ClientHandle`]. It
//! initializes lazily with linear backoff, lets concurrent callers share
//! one in-flight initialization, and drops the handle when a caller
//! reports it as dead so the next request re-initializes.
//!
//! # Concurrency design
//!
//! - `state` is a `parking_lot::RwLock` read on every request; it is never
//!   held across an await.
//! - `init_lock` is an async mutex serializing transitions out of
//!   Uninitialized/Failed. Callers queued behind a failing initialization
//!   detect it through `generation` and share that failure instead of
//!   starting a new round of attempts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;

use crate::state::InitPolicy;
use crate::upstream::retry::with_linear_backoff;
use crate::upstream::{CatalogProvider, ClientHandle, SessionOptions};

/// Observable lifecycle state of the upstream session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

/// Initialization gave up after exhausting its attempts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("upstream initialization failed after {attempts} attempt(s): {last_error}")]
pub struct InitError {
    pub attempts: u32,
    pub last_error: String,
}

enum Lifecycle {
    Uninitialized,
    Initializing,
    Ready(ClientHandle),
    Failed(InitError),
}

impl Lifecycle {
    fn client_state(&self) -> ClientState {
        match self {
            Self::Uninitialized => ClientState::Uninitialized,
            Self::Initializing => ClientState::Initializing,
            Self::Ready(_) => ClientState::Ready,
            Self::Failed(_) => ClientState::Failed,
        }
    }
}

/// Owns the upstream session and its lifecycle.
pub struct ReadinessManager {
    provider: Arc<dyn CatalogProvider>,
    options: SessionOptions,
    policy: InitPolicy,
    state: RwLock<Lifecycle>,
    init_lock: tokio::sync::Mutex<()>,
    /// Incremented each time an initialization round completes.
    generation: AtomicU64,
}

impl ReadinessManager {
    pub fn new(
        provider: Arc<dyn CatalogProvider>,
        options: SessionOptions,
        policy: InitPolicy,
    ) -> Self {
        Self {
            provider,
            options,
            policy,
            state: RwLock::new(Lifecycle::Uninitialized),
            init_lock: tokio::sync::Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Returns the session handle, initializing it first if needed.
    ///
    /// At most one initialization runs at a time. Attempt `n` that fails
    /// waits `backoff_ms * n` before the next.
    ///
    /// # Errors
    ///
    /// Returns [`InitError`] once `max_attempts` initializations have
    /// failed, or when the round this caller waited on failed.
    pub async fn ensure_ready(
        &self,
        max_attempts: u32,
        backoff_ms: u64,
    ) -> Result<ClientHandle, InitError> {
        if let Some(handle) = self.current() {
            return Ok(handle);
        }

        let observed = self.generation.load(Ordering::Acquire);
        let _permit = self.init_lock.lock().await;

        match &*self.state.read() {
            Lifecycle::Ready(handle) => return Ok(Arc::clone(handle)),
            Lifecycle::Failed(err) if self.generation.load(Ordering::Acquire) != observed => {
                return Err(err.clone());
            }
            _ => {}
        }

        *self.state.write() = Lifecycle::Initializing;
        let _reset = InitializingGuard { manager: self };

        log::info!(
            "[Readiness] Initializing upstream session (max_attempts={}, backoff={}ms)",
            max_attempts,
            backoff_ms
        );

        let provider = &self.provider;
        let options = &self.options;
        let result = with_linear_backoff(
            "Upstream initialization",
            max_attempts,
            backoff_ms,
            move |attempt| {
                log::debug!("[Readiness] Initialization attempt {}", attempt);
                provider.initialize(options)
            },
        )
        .await;

        self.generation.fetch_add(1, Ordering::AcqRel);

        match result {
            Ok(handle) => {
                *self.state.write() = Lifecycle::Ready(Arc::clone(&handle));
                log::info!("[Readiness] Upstream session ready");
                Ok(handle)
            }
            Err((attempts, e)) => {
                let err = InitError {
                    attempts,
                    last_error: e.to_string(),
                };
                *self.state.write() = Lifecycle::Failed(err.clone());
                Err(err)
            }
        }
    }

    /// [`ensure_ready`](Self::ensure_ready) with the configured policy.
    pub async fn ready(&self) -> Result<ClientHandle, InitError> {
        self.ensure_ready(self.policy.max_attempts, self.policy.backoff_ms)
            .await
    }

    pub fn state(&self) -> ClientState {
        self.state.read().client_state()
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.read(), Lifecycle::Ready(_))
    }

    /// Drops the current handle so the next caller re-initializes.
    pub fn invalidate(&self, reason: &str) {
        let mut state = self.state.write();
        if matches!(*state, Lifecycle::Ready(_) | Lifecycle::Failed(_)) {
            log::warn!("[Readiness] Session invalidated: {}", reason);
            *state = Lifecycle::Uninitialized;
        }
    }

    /// Drops the handle only if it is still `handle`.
    ///
    /// A request that held a stale handle must not tear down a session
    /// another request has already re-established.
    pub fn invalidate_if_current(&self, handle: &ClientHandle, reason: &str) -> bool {
        let mut state = self.state.write();
        let current = matches!(&*state, Lifecycle::Ready(h) if same_session(h, handle));
        if current {
            log::warn!("[Readiness] Session invalidated: {}", reason);
            *state = Lifecycle::Uninitialized;
        }
        current
    }

    fn current(&self) -> Option<ClientHandle> {
        match &*self.state.read() {
            Lifecycle::Ready(handle) => Some(Arc::clone(handle)),
            _ => None,
        }
    }
}

fn same_session(a: &ClientHandle, b: &ClientHandle) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Resets Initializing back to Uninitialized if the initializing future is
/// dropped mid-flight (the request that drove it was cancelled). A no-op
/// once the round has recorded Ready or Failed.
struct InitializingGuard<'a> {
    manager: &'a ReadinessManager,
}

impl Drop for InitializingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.manager.state.write();
        if matches!(*state, Lifecycle::Initializing) {
            log::debug!("[Readiness] Initialization abandoned");
            *state = Lifecycle::Uninitialized;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockProvider, MockSession};
    use futures::future::join_all;
    use std::time::Duration;

    fn manager(provider: &Arc<MockProvider>) -> ReadinessManager {
        ReadinessManager::new(
            Arc::clone(provider) as Arc<dyn CatalogProvider>,
            SessionOptions::default(),
            InitPolicy {
                max_attempts: 3,
                backoff_ms: 100,
            },
        )
    }

    fn provider() -> MockProvider {
        MockProvider::new(Arc::new(MockSession::default()))
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_initialization() {
        let provider = Arc::new(provider().with_delay(Duration::from_millis(50)));
        let manager = manager(&provider);

        let results = join_all((0..10).map(|_| manager.ready())).await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(provider.calls(), 1);
        assert_eq!(manager.state(), ClientState::Ready);

        let first = results[0].as_ref().unwrap();
        assert!(results
            .iter()
            .all(|r| same_session(r.as_ref().unwrap(), first)));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried() {
        let provider = Arc::new(provider().failing(2));
        let manager = manager(&provider);

        assert!(manager.ready().await.is_ok());
        assert_eq!(provider.calls(), 3);
        assert!(manager.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_reports_failed_then_retries_on_next_call() {
        let provider = Arc::new(provider().always_failing());
        let manager = manager(&provider);

        let Err(err) = manager.ready().await else {
            panic!("initialization should have been exhausted");
        };
        assert_eq!(err.attempts, 3);
        assert!(err.last_error.contains("503"));
        assert_eq!(manager.state(), ClientState::Failed);

        let _ = manager.ready().await;
        assert_eq!(provider.calls(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn queued_callers_share_a_failed_round() {
        let provider = Arc::new(provider().always_failing());
        let manager = manager(&provider);

        let results = join_all((0..4).map(|_| manager.ensure_ready(2, 10))).await;

        assert!(results.iter().all(Result::is_err));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_forces_reinitialization() {
        let provider = Arc::new(provider());
        let manager = manager(&provider);

        manager.ready().await.unwrap();
        manager.invalidate("session expired");
        assert_eq!(manager.state(), ClientState::Uninitialized);

        manager.ready().await.unwrap();
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_handle_does_not_invalidate_fresh_session() {
        let provider = Arc::new(provider());
        let manager = manager(&provider);

        let stale = manager.ready().await.unwrap();
        assert!(manager.invalidate_if_current(&stale, "401"));
        manager.ready().await.unwrap();

        // MockProvider hands out the same session; simulate a fresh one.
        let unrelated: ClientHandle = Arc::new(MockSession::default());
        assert!(!manager.invalidate_if_current(&unrelated, "401"));
        assert!(manager.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_initialization_resets_state() {
        let provider = Arc::new(provider().hanging());
        let manager = manager(&provider);

        let attempt = tokio::time::timeout(Duration::from_millis(100), manager.ready()).await;
        assert!(attempt.is_err());
        assert_eq!(manager.state(), ClientState::Uninitialized);
    }

    #[test]
    fn client_state_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(ClientState::Uninitialized).unwrap(),
            "uninitialized"
        );
    }
}
