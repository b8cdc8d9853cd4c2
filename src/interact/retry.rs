//! Bounded retry combinator
//!
//! The single retry loop behind every interaction primitive. Retries only
//! transient failure classes; everything else propagates on first sight.

use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::Result;

/// Run `op` up to `max_attempts` times, sleeping `backoff` between attempts.
///
/// Only errors with [`crate::Error::is_transient`] are retried; a
/// non-transient error returns immediately. When the budget is exhausted the
/// last error is re-raised to the caller.
pub async fn with_retries<T, F, Fut>(
    description: &str,
    max_attempts: u32,
    backoff: Duration,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    info!("'{}' succeeded on attempt {}", description, attempt);
                }
                return Ok(value);
            }
            Err(e) if e.is_transient() && attempt < max_attempts => {
                warn!(
                    "Attempt {} at '{}' failed due to {}. Retrying...",
                    attempt,
                    description,
                    e.class_name()
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => {
                if e.is_transient() {
                    error!("'{}' failed after {} attempts.", description, attempt);
                }
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::{AtomicU32, Ordering};

    const NO_BACKOFF: Duration = Duration::from_millis(1);

    #[tokio::test]
    async fn test_succeeds_first_attempt() {
        let calls = AtomicU32::new(0);

        let result = with_retries("op", 3, NO_BACKOFF, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Error>(42)
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let calls = AtomicU32::new(0);

        let result = with_retries("op", 3, NO_BACKOFF, || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(Error::stale_element("not yet"))
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_budget_and_reraises_last_error() {
        let calls = AtomicU32::new(0);

        let result: Result<()> = with_retries("op", 3, NO_BACKOFF, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::click_intercepted("overlay in the way"))
        })
        .await;

        assert!(matches!(result, Err(Error::ClickIntercepted(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_transient_fails_immediately() {
        let calls = AtomicU32::new(0);

        let result: Result<()> = with_retries("op", 5, NO_BACKOFF, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::element_not_found("never existed"))
        })
        .await;

        assert!(matches!(result, Err(Error::ElementNotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_clamps_to_one() {
        let calls = AtomicU32::new(0);

        let result = with_retries("op", 0, NO_BACKOFF, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Error>(())
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
