//! Exponential backoff retry for transient provider failures.

use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::debug;

use crate::error::ProviderError;

/// Default: 3 total attempts, base 1s, max 30s.
pub const MAX_ATTEMPTS: u32 = 3;
const INITIAL_INTERVAL_SECS: u64 = 1;
const MAX_INTERVAL_SECS: u64 = 30;

/// How often, and how patiently, a live call is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            initial_interval: Duration::from_secs(INITIAL_INTERVAL_SECS),
            max_interval: Duration::from_secs(MAX_INTERVAL_SECS),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no waiting.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

/// Retry a provider call with exponential backoff.
///
/// `attempt` is called up to `policy.max_attempts` times. Errors that are
/// not [`ProviderError::is_retryable`] are returned immediately. When every
/// attempt fails, the last error is wrapped in
/// [`ProviderError::RetriesExhausted`].
pub async fn retry_with_backoff<T, Fut, F>(
    policy: RetryPolicy,
    mut attempt: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut backoff = ExponentialBackoff {
        initial_interval: policy.initial_interval,
        max_interval: policy.max_interval,
        max_elapsed_time: None,
        ..Default::default()
    };

    let mut attempts = 0;

    loop {
        attempts += 1;

        let error = match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if !error.is_retryable() {
            return Err(error);
        }

        if attempts >= max_attempts {
            if attempts == 1 {
                return Err(error);
            }
            return Err(ProviderError::RetriesExhausted {
                attempts,
                last: Box::new(error),
            });
        }

        if let Some(wait_duration) = backoff.next_backoff() {
            debug!(
                "Attempt {}/{} failed: {}. Retrying in {:?}",
                attempts, max_attempts, error, wait_duration
            );
            tokio::time::sleep(wait_duration).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn server_error() -> ProviderError {
        ProviderError::Status {
            provider: "OpenAI",
            status: 503,
            body: "busy".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_succeeds_on_first_attempt() {
        let result = retry_with_backoff(RetryPolicy::default(), || async { Ok("ok") }).await;
        assert_eq!(result.unwrap(), "ok");
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausts_after_max_attempts() {
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = count.clone();

        let result: Result<(), ProviderError> = retry_with_backoff(RetryPolicy::default(), move || {
            let c = count_clone.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(server_error())
            }
        })
        .await;

        assert!(matches!(
            result,
            Err(ProviderError::RetriesExhausted { attempts: MAX_ATTEMPTS, .. })
        ));
        assert_eq!(count.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_succeeds_after_failures() {
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = count.clone();

        let result = retry_with_backoff(RetryPolicy::default(), move || {
            let c = count_clone.clone();
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(server_error())
                } else {
                    Ok("recovered")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_stops_immediately() {
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = count.clone();

        let result: Result<(), ProviderError> = retry_with_backoff(RetryPolicy::default(), move || {
            let c = count_clone.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::Status {
                    provider: "Anthropic",
                    status: 401,
                    body: "invalid x-api-key".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(ProviderError::Status { status: 401, .. })));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_policy_returns_raw_error() {
        let result: Result<(), ProviderError> =
            retry_with_backoff(RetryPolicy::none(), || async { Err(server_error()) }).await;
        assert!(matches!(result, Err(ProviderError::Status { status: 503, .. })));
    }
}
