//! Retry policy for logical calls.
//!
//! A call is attempted once, then retried up to `max_retries` more times
//! while its result is retryable. The delay before retry `i` (1-indexed) is
//! `base_delay * i`: linear, not exponential.

use std::future::Future;
use std::time::Duration;

use findata_core::Outcome;
use findata_store::AppConfig;
use tracing::{debug, warn};

/// Results that know whether they are worth another attempt.
pub trait Retryable {
    /// Returns true if the operation should be attempted again.
    fn should_retry(&self) -> bool;
}

impl Retryable for Outcome {
    fn should_retry(&self) -> bool {
        self.is_retryable()
    }
}

impl<T, E: Retryable> Retryable for Result<T, E> {
    fn should_retry(&self) -> bool {
        self.as_ref().err().is_some_and(|e| e.should_retry())
    }
}

/// Strategy for retrying failed calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryStrategy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    /// Delay before the first retry. Retry `i` waits `i` times as long.
    pub base_delay: Duration,
}

impl RetryStrategy {
    /// Creates a strategy with the default one second base delay.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_secs(1),
        }
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Uses the retry settings of `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.max_retries).with_base_delay(config.retry_delay)
    }

    /// Sets the base delay.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Delay before retry number `retry` (1-indexed).
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(retry)
    }

    /// Upper bound on the number of attempts of one call.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Whether another attempt may follow attempt number `attempt`.
    pub fn has_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts()
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// The final result of a retried operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Retried<T> {
    /// Result of the last attempt.
    pub value: T,
    /// Attempts made, at least one.
    pub attempts: u32,
}

/// Runs `operation` and retries it while its result asks for it.
///
/// Attempts are strictly sequential: attempt `n + 1` starts only after
/// attempt `n` resolved and its backoff elapsed. The closure receives the
/// 1-indexed attempt number.
pub async fn with_retry<T, F, Fut>(strategy: &RetryStrategy, mut operation: F) -> Retried<T>
where
    T: Retryable,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = T>,
{
    let mut attempt = 1;
    loop {
        let value = operation(attempt).await;

        if !value.should_retry() {
            return Retried { value, attempts: attempt };
        }

        // The n-th retry follows the n-th attempt
        if !strategy.has_retry_after(attempt) {
            warn!(attempts = attempt, "Retries exhausted");
            return Retried { value, attempts: attempt };
        }

        let delay = strategy.delay_for_attempt(attempt);
        debug!(attempt, delay = ?delay, "Retrying after backoff");
        tokio::time::sleep(delay).await;
        attempt = attempt.saturating_add(1);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[derive(Debug, PartialEq)]
    struct Flaky(bool);

    impl Retryable for Flaky {
        fn should_retry(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_linear_backoff() {
        let strategy = RetryStrategy::default();

        assert_eq!(strategy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(strategy.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(strategy.delay_for_attempt(3), Duration::from_secs(3));
        assert_eq!(strategy.max_attempts(), 4);
    }

    #[test]
    fn test_no_retry() {
        let strategy = RetryStrategy::no_retry();
        assert_eq!(strategy.max_attempts(), 1);
        assert_eq!(strategy.delay_for_attempt(1), Duration::ZERO);
    }

    #[test]
    fn test_unbounded_retries_saturate() {
        let strategy = RetryStrategy::new(u32::MAX).with_base_delay(Duration::from_secs(1));

        assert_eq!(strategy.max_attempts(), u32::MAX);
        assert!(strategy.has_retry_after(u32::MAX - 1));
        assert!(!strategy.has_retry_after(u32::MAX));
        assert_eq!(
            strategy.delay_for_attempt(u32::MAX),
            Duration::from_secs(u64::from(u32::MAX))
        );

        let bounded = RetryStrategy::new(3);
        assert!(bounded.has_retry_after(3));
        assert!(!bounded.has_retry_after(4));
    }

    #[test]
    fn test_from_config() {
        let config = AppConfig::default().with_retry(5, Duration::from_millis(250));
        let strategy = RetryStrategy::from_config(&config);
        assert_eq!(strategy.max_retries, 5);
        assert_eq!(strategy.delay_for_attempt(2), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_retries_with_linear_delays() {
        let strategy = RetryStrategy::new(3);
        let start = Instant::now();
        let starts = std::sync::Mutex::new(Vec::new());

        let result = with_retry(&strategy, |_| {
            starts.lock().unwrap().push(start.elapsed());
            async { Flaky(true) }
        })
        .await;

        assert_eq!(result.attempts, 4);
        let expected = [0, 1, 3, 6].map(Duration::from_secs);
        for (actual, expected) in starts.lock().unwrap().iter().zip(expected) {
            assert!(*actual >= expected && *actual < expected + Duration::from_millis(10));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_at_first_final_result() {
        let calls = AtomicU32::new(0);

        let result = with_retry(&RetryStrategy::new(3), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Flaky(attempt < 2) }
        })
        .await;

        assert_eq!(result.value, Flaky(false));
        assert_eq!(result.attempts, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_outcome_classification_drives_retry() {
        let strategy = RetryStrategy::new(3);

        let not_found = with_retry(&strategy, |_| async {
            Outcome::HttpFailure {
                status: 404,
                message: "Resource not found".to_string(),
                detail: None,
            }
        })
        .await;
        assert_eq!(not_found.attempts, 1);

        let unavailable = with_retry(&strategy, |_| async {
            Outcome::HttpFailure {
                status: 503,
                message: "Internal server error".to_string(),
                detail: None,
            }
        })
        .await;
        assert_eq!(unavailable.attempts, 4);
    }
}
