//! Retry with exponential backoff for provider requests.
//!
//! Only transient failures are retried: HTTP 429, network errors, and 5xx
//! responses. Everything else (404, other 4xx, malformed bodies, provider
//! rejections) is returned on the first occurrence.

use std::future::Future;
use std::time::Duration;

use crate::error::ProviderError;

fn is_retriable(err: &ProviderError) -> bool {
    match err {
        ProviderError::RateLimited { .. } | ProviderError::Http(_) => true,
        ProviderError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// Sleeps `backoff_base_secs * 2^attempt` seconds between attempts, for at
/// most `max_retries` retries after the first try. The last error is
/// returned once retries are exhausted.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient provider error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
