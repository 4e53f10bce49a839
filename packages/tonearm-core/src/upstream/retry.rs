//! Linear-backoff retry for upstream initialization.
//!
//! Attempt `n` that fails waits `backoff_ms * n` before attempt `n + 1`,
//! so recovery stays prompt without spinning.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Executes `operation` up to `max_attempts` times with linear backoff.
///
/// `operation` receives the 1-based attempt number. A `max_attempts` of
/// zero is treated as one. On exhaustion returns the number of attempts
/// made together with the last error.
///
/// # Arguments
/// * `action` - Action name for logging
/// * `max_attempts` - Upper bound on attempts
/// * `backoff_ms` - Base delay multiplied by the attempt number
/// * `operation` - Closure that performs one attempt
pub(crate) async fn with_linear_backoff<T, E, F, Fut>(
    action: &str,
    max_attempts: u32,
    backoff_ms: u64,
    mut operation: F,
) -> Result<T, (u32, E)>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts => {
                let delay_ms = backoff_ms.saturating_mul(u64::from(attempt));
                log::warn!(
                    "[Upstream] {} failed (attempt {}/{}): {}; retrying in {}ms",
                    action,
                    attempt,
                    max_attempts,
                    e,
                    delay_ms
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                attempt += 1;
            }
            Err(e) => {
                log::error!(
                    "[Upstream] {} failed after {} attempt(s): {}",
                    action,
                    attempt,
                    e
                );
                return Err((attempt, e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn backoff_grows_linearly() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let started = Instant::now();

        let result: Result<(), (u32, String)> =
            with_linear_backoff("test", 3, 100, |_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err("boom".to_string())
            })
            .await;

        assert_eq!(result, Err((3, "boom".to_string())));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 100ms after attempt 1, 200ms after attempt 2, nothing after the last.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(350), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn stops_at_first_success() {
        let result: Result<u32, (u32, String)> =
            with_linear_backoff("test", 5, 50, |attempt| async move {
                if attempt < 2 {
                    Err(format!("attempt {attempt}"))
                } else {
                    Ok(attempt)
                }
            })
            .await;
        assert_eq!(result, Ok(2));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_still_tries_once() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), (u32, &str)> = with_linear_backoff("test", 0, 10, |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err("nope")
        })
        .await;
        assert_eq!(result, Err((1, "nope")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
