//! Bounded exponential backoff with jitter for page fetches.
//!
//! [`retry_with_backoff`] wraps one fetch attempt and retries it on
//! transient failures. Every call gets its own attempt budget; nothing is
//! shared between fetches of different URLs.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::{ExtractionError, FetchError};

/// Attempt budget and delay schedule for a single fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Cap applied to the exponential part, before jitter.
    pub max_delay: Duration,
    /// Uniform jitter in `0..=max_jitter` added to every delay.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay: Duration::from_millis(400),
            max_delay: Duration::from_secs(30),
            max_jitter: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// No retries and no sleeping. Used by tests and one-shot tooling.
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
        }
    }

    /// Deterministic part of the delay after the failed attempt `attempt_index`
    /// (0-based): `min(max_delay, base_delay * 2^attempt_index)`.
    ///
    /// | Attempt index | Default policy |
    /// |---------------|----------------|
    /// | 0             | 400 ms         |
    /// | 1             | 800 ms         |
    /// | 4             | 6.4 s          |
    /// | 7+            | 30 s (cap)     |
    #[must_use]
    pub fn base_delay_for(&self, attempt_index: u32) -> Duration {
        self.base_delay
            .saturating_mul(1u32 << attempt_index.min(31))
            .min(self.max_delay)
    }

    /// Full delay including a fresh random jitter.
    #[must_use]
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        let jitter_ms = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=jitter_ms)
        };
        self.base_delay_for(attempt_index) + Duration::from_millis(jitter)
    }
}

/// Returns `true` for failures worth another attempt with a new identity.
///
/// Permanent client errors (404, 410) stop immediately. Every other status
/// >= 400 is retried, including 403 and 429 which the marketplace uses for
/// bot defense. A page without embedded state (captcha or interstitial) is
/// retried; state that is present but malformed is not.
pub(crate) fn is_retriable(err: &FetchError) -> bool {
    match err {
        FetchError::Http(e) => !e.is_builder(),
        FetchError::Status { status, .. } => !matches!(status, 404 | 410),
        FetchError::Extraction(e) => matches!(e, ExtractionError::NotFound),
        FetchError::Failed { .. } => false,
    }
}

/// Runs `operation` until it succeeds, fails terminally, or the policy's
/// attempt budget is spent.
///
/// Any failure is returned as [`FetchError::Failed`] carrying `label`, the
/// number of attempts made, and the last underlying error.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        attempts += 1;

        if !is_retriable(&err) || attempts >= max_attempts {
            return Err(FetchError::Failed {
                label: label.to_owned(),
                attempts,
                source: Box::new(err),
            });
        }

        let delay = policy.delay_for(attempts - 1);
        tracing::warn!(
            label,
            attempt = attempts,
            max_attempts,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "fetch attempt failed, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn server_error() -> FetchError {
        FetchError::Status {
            status: 503,
            url: "https://example.com/ofertas".to_owned(),
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            ..RetryPolicy::no_retry()
        }
    }

    #[test]
    fn default_policy_matches_documented_budget() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 10);
        assert_eq!(policy.base_delay_for(0), Duration::from_millis(400));
        assert_eq!(policy.base_delay_for(1), Duration::from_millis(800));
        assert_eq!(policy.base_delay_for(4), Duration::from_millis(6_400));
    }

    #[test]
    fn base_delay_is_non_decreasing_and_capped() {
        let policy = RetryPolicy::default();
        let mut previous = Duration::ZERO;
        for attempt in 0..40 {
            let delay = policy.base_delay_for(attempt);
            assert!(delay >= previous, "delay shrank at attempt {attempt}");
            assert!(delay <= Duration::from_secs(30));
            previous = delay;
        }
        assert_eq!(policy.base_delay_for(7), Duration::from_secs(30));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let policy = RetryPolicy::default();
        for _ in 0..200 {
            let delay = policy.delay_for(0);
            assert!(delay >= Duration::from_millis(400));
            assert!(delay <= Duration::from_millis(600));
        }
    }

    #[test]
    fn not_found_and_gone_are_not_retriable() {
        for status in [404, 410] {
            let err = FetchError::Status {
                status,
                url: "https://example.com".to_owned(),
            };
            assert!(!is_retriable(&err), "{status} should be terminal");
        }
    }

    #[test]
    fn forbidden_and_server_errors_are_retriable() {
        for status in [403, 429, 500, 503] {
            let err = FetchError::Status {
                status,
                url: "https://example.com".to_owned(),
            };
            assert!(is_retriable(&err), "{status} should be retried");
        }
    }

    #[test]
    fn missing_state_is_retriable_but_malformed_state_is_not() {
        assert!(is_retriable(&FetchError::Extraction(ExtractionError::NotFound)));

        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let malformed = FetchError::Extraction(ExtractionError::InvalidJson {
            strategy: "state script",
            source,
        });
        assert!(!is_retriable(&malformed));
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(&fast_policy(10), "test", || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, FetchError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fails_three_times_then_succeeds_on_fourth() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(&fast_policy(10), "test", || {
            let c = Arc::clone(&c);
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 4 {
                    Err(server_error())
                } else {
                    Ok::<u32, FetchError>(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn wraps_last_error_after_exhausting_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(&fast_policy(3), "scrape https://example.com", || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, FetchError>(server_error())
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(FetchError::Failed {
                label,
                attempts,
                source,
            }) => {
                assert_eq!(label, "scrape https://example.com");
                assert_eq!(attempts, 3);
                assert!(matches!(*source, FetchError::Status { status: 503, .. }));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn does_not_retry_not_found() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(&fast_policy(10), "test", || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, FetchError>(FetchError::Status {
                    status: 404,
                    url: "https://example.com/p/MLM1".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "404 must not be retried");
        let err = result.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn zero_attempt_policy_still_tries_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let _ = retry_with_backoff(&fast_policy(0), "test", || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, FetchError>(server_error())
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
