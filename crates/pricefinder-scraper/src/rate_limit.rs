//! Retry with exponential back-off and jitter for catalog and quote requests.
//!
//! Transient failures (429, timeouts, connection errors, 5xx) are retried;
//! everything else, including 404s the resolver relies on, is returned on
//! the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` if `err` is worth retrying after a back-off delay.
///
/// Retriable:
/// - [`ScraperError::RateLimited`]: HTTP 429.
/// - [`ScraperError::Http`] timeouts and connection failures.
/// - [`ScraperError::UnexpectedStatus`] with a 5xx status.
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } => true,
        ScraperError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ScraperError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        _ => false,
    }
}

/// Runs `operation`, retrying transient errors up to `max_retries` extra times.
///
/// See [`backoff_delay_ms`] for the wait between attempts. With
/// `max_retries = 1` an operation is attempted at most twice.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let jitter = rand::random::<f64>() * 0.5 + 0.75;
                let delay_ms = backoff_delay_ms(attempt, backoff_base_ms, &err, jitter);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient upstream error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Wait before retry number `attempt` (1-based).
///
/// `backoff_base_ms * 2^(attempt-1)` scaled by `jitter`, raised to the
/// server's `Retry-After` on a 429, and capped at 30 s either way.
pub(crate) fn backoff_delay_ms(
    attempt: u32,
    backoff_base_ms: u64,
    err: &ScraperError,
    jitter: f64,
) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (computed.min(MAX_DELAY_MS) as f64 * jitter) as u64;

    let floor = match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } => retry_after_secs.saturating_mul(1_000),
        _ => 0,
    };

    jittered.max(floor).min(MAX_DELAY_MS)
}
