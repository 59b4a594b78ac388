//! Recovery Tier 1: exponential-backoff retry
//!
//! Wraps a fallible async operation and re-executes it on transient
//! failure. The wrapper never alters the success value or the
//! failure's identity — after the retry budget is spent, the caller
//! observes the original failure, not a wrapped or replaced one.
//!
//! Attempts for a single invocation are strictly sequential; the only
//! suspension point is the backoff wait between a failed attempt and
//! the next retry, and a [`CancelToken`] can abort that wait.

#![deny(unsafe_code)]

mod cancel;

pub use cancel::CancelToken;

use std::collections::HashSet;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use trellis_types::{FailureKind, Recoverable};

/// Exponential-backoff retry configuration.
///
/// Total attempts are `max_retries + 1`. The delay before retry `k`
/// (1-based) is `base_delay * 2^(k-1)`.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    retryable: HashSet<FailureKind>,
}

impl RetryPolicy {
    /// Create a policy retrying the default transient kinds.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            retryable: FailureKind::transient().into_iter().collect(),
        }
    }

    /// Replace the retryable set.
    pub fn retryable_kinds(mut self, kinds: impl IntoIterator<Item = FailureKind>) -> Self {
        self.retryable = kinds.into_iter().collect();
        self
    }

    /// Add one kind to the retryable set.
    pub fn retry_on(mut self, kind: FailureKind) -> Self {
        self.retryable.insert(kind);
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Whether failures of this kind are retried at all.
    pub fn is_retryable(&self, kind: FailureKind) -> bool {
        self.retryable.contains(&kind)
    }

    /// Delay inserted after attempt `attempt` (0-based) fails.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(Duration::MAX)
    }

    /// Execute `op`, retrying transient failures with exponential
    /// backoff.
    ///
    /// Success returns the operation's result untouched, with no extra
    /// latency. A failure whose kind is outside the retryable set
    /// propagates immediately — no delay, no retry logging.
    pub async fn run<T, E, F, Fut>(&self, op_name: &str, op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Recoverable + Display,
    {
        self.run_with_cancel(op_name, &CancelToken::new(), op).await
    }

    /// Execute `op` with a cancellation signal threaded through the
    /// backoff wait.
    ///
    /// Cancellation during a backoff wait surfaces the most recent
    /// failure immediately, without waiting out the remaining delay
    /// and without issuing further attempts. The surfaced value is the
    /// operation's own failure, unchanged.
    pub async fn run_with_cancel<T, E, F, Fut>(
        &self,
        op_name: &str,
        cancel: &CancelToken,
        mut op: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Recoverable + Display,
    {
        let mut attempt: u32 = 0;
        loop {
            let failure = match op().await {
                Ok(value) => return Ok(value),
                Err(failure) => failure,
            };

            if !self.is_retryable(failure.kind()) {
                return Err(failure);
            }

            if attempt >= self.max_retries {
                tracing::error!(
                    operation = op_name,
                    retries = self.max_retries,
                    "retry budget exhausted"
                );
                return Err(failure);
            }

            let delay = self.delay_for(attempt);
            tracing::warn!(
                operation = op_name,
                attempt = attempt + 1,
                max_retries = self.max_retries,
                delay_ms = delay.as_millis() as u64,
                failure = %failure,
                "retrying after transient failure"
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => {
                    tracing::warn!(operation = op_name, "retry aborted during backoff");
                    return Err(failure);
                }
            }

            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[derive(Debug, PartialEq, thiserror::Error)]
    enum ProbeFailure {
        #[error("simulated transient failure")]
        Flaky,
        #[error("simulated permanent failure")]
        Fatal,
    }

    impl Recoverable for ProbeFailure {
        fn kind(&self) -> FailureKind {
            match self {
                ProbeFailure::Flaky => FailureKind::Timeout,
                ProbeFailure::Fatal => FailureKind::InvalidInput,
            }
        }
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(800));
    }

    #[tokio::test]
    async fn test_success_passes_through_untouched() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        let calls = AtomicU32::new(0);
        let result: Result<u32, ProbeFailure> = policy
            .run("healthy", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(42) }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_surfaces_original_failure() {
        // maxRetries=2, baseDelay=0.1s: 3 invocations, >= 0.3s elapsed
        let policy = RetryPolicy::new(2, Duration::from_millis(100));
        let calls = AtomicU32::new(0);
        let started = Instant::now();
        let result: Result<(), ProbeFailure> = policy
            .run("doomed", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ProbeFailure::Flaky) }
            })
            .await;
        assert_eq!(result.unwrap_err(), ProbeFailure::Flaky);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_propagates_with_zero_delay() {
        let policy = RetryPolicy::new(5, Duration::from_secs(10));
        let calls = AtomicU32::new(0);
        let started = Instant::now();
        let result: Result<(), ProbeFailure> = policy
            .run("rejected", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ProbeFailure::Fatal) }
            })
            .await;
        assert_eq!(result.unwrap_err(), ProbeFailure::Fatal);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_zero_retries_means_single_attempt() {
        let policy = RetryPolicy::new(0, Duration::from_millis(100));
        let calls = AtomicU32::new(0);
        let result: Result<(), ProbeFailure> = policy
            .run("one_shot", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ProbeFailure::Flaky) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let policy = RetryPolicy::new(3, Duration::from_millis(50));
        let calls = AtomicU32::new(0);
        let result: Result<&str, ProbeFailure> = policy
            .run("eventually_fine", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(ProbeFailure::Flaky)
                    } else {
                        Ok("recovered")
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_backoff_surfaces_failure_immediately() {
        let policy = RetryPolicy::new(5, Duration::from_secs(60));
        let token = CancelToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });

        let calls = AtomicU32::new(0);
        let started = Instant::now();
        let result: Result<(), ProbeFailure> = policy
            .run_with_cancel("doomed", &token, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ProbeFailure::Flaky) }
            })
            .await;

        assert_eq!(result.unwrap_err(), ProbeFailure::Flaky);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // Aborted well before the 60s backoff would have elapsed
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_custom_retryable_set() {
        let policy = RetryPolicy::new(2, Duration::from_millis(10))
            .retryable_kinds([FailureKind::InvalidInput]);
        assert!(policy.is_retryable(FailureKind::InvalidInput));
        assert!(!policy.is_retryable(FailureKind::Timeout));

        let calls = AtomicU32::new(0);
        let result: Result<(), ProbeFailure> = policy
            .run("inverted", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ProbeFailure::Flaky) }
            })
            .await;
        // Timeout kind is no longer retryable under this policy
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
