//! Retry with exponential backoff for transient provider errors. Shaped
//! after the backoff loop in the teacher's circuit breaker: start at an
//! initial delay, double on each transient failure, cap at a maximum.

use std::future::Future;
use std::time::Duration;

use crate::error::ProviderError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(200);
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(5);

pub async fn retry_with_backoff<F, Fut, T>(mut op: F) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut backoff = DEFAULT_INITIAL_BACKOFF;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < DEFAULT_MAX_ATTEMPTS => {
                tracing::debug!(attempt, ?backoff, error = %err, "retrying transient provider error");
                tokio::time::sleep(backoff).await;
                backoff = std::cmp::min(backoff.mul_f64(2.0), DEFAULT_MAX_BACKOFF);
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let attempts = Arc::new(AtomicU32::new(0));
        let a = attempts.clone();
        let result: Result<&str, ProviderError> = retry_with_backoff(|| {
            let a = a.clone();
            async move {
                if a.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ProviderError::NetworkTimeout)
                } else {
                    Ok("ok")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_non_transient_errors() {
        let attempts = Arc::new(AtomicU32::new(0));
        let a = attempts.clone();
        let result: Result<(), ProviderError> = retry_with_backoff(|| {
            let a = a.clone();
            async move {
                a.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::AuthFailed)
            }
        })
        .await;

        assert!(matches!(result, Err(ProviderError::AuthFailed)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let attempts = Arc::new(AtomicU32::new(0));
        let a = attempts.clone();
        let result: Result<(), ProviderError> = retry_with_backoff(|| {
            let a = a.clone();
            async move {
                a.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::RateLimited)
            }
        })
        .await;

        assert!(matches!(result, Err(ProviderError::RateLimited)));
        assert_eq!(attempts.load(Ordering::SeqCst), DEFAULT_MAX_ATTEMPTS);
    }
}
