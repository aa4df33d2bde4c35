//! Retry logic.
//!
//! # Responsibilities
//! - Re-run an operation while its failure is classified as retryable
//! - Bound the attempt count and wait a fixed delay between attempts
//! - Stop as soon as the call context is cancelled
//!
//! # Design Decisions
//! - The policy knows nothing about HTTP; the caller supplies the predicate
//! - Exhausting the budget returns the last error unchanged
//! - No delay after the final attempt

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::context::{CallContext, Interrupted};

/// Attempt budget used when a request leaves its retry count at zero.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// Fixed pause between two attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Bounded, fixed-delay retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Policy for `attempts` tries with the default delay; zero selects
    /// [`DEFAULT_MAX_ATTEMPTS`].
    pub fn for_attempts(attempts: u32) -> Self {
        let max_attempts = if attempts == 0 { DEFAULT_MAX_ATTEMPTS } else { attempts };
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempt budget is spent.
    ///
    /// `operation` receives the 1-based attempt number. The inter-attempt
    /// delay is raced against `ctx`; an interruption is returned as `E`.
    pub async fn run<T, E, F, Fut, P>(&self, ctx: &CallContext, mut operation: F, is_retryable: P) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: From<Interrupted> + Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            if let Some(interrupted) = ctx.err() {
                return Err(E::from(interrupted));
            }

            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < max_attempts && is_retryable(&e) => {
                    tracing::info!(
                        attempt,
                        max_attempts,
                        delay = ?self.delay,
                        error = %e,
                        "Transient upstream failure, retrying"
                    );
                    ctx.run(sleep(self.delay))
                        .await
                        .map_err(|interrupted| E::from(interrupted))?;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient,
        Fatal,
        Interrupted(Interrupted),
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    impl From<Interrupted> for TestError {
        fn from(i: Interrupted) -> Self {
            TestError::Interrupted(i)
        }
    }

    fn fast(attempts: u32) -> RetryPolicy {
        RetryPolicy::for_attempts(attempts).with_delay(Duration::from_millis(1))
    }

    #[test]
    fn test_zero_attempts_uses_default() {
        assert_eq!(RetryPolicy::for_attempts(0).max_attempts, 6);
        assert_eq!(RetryPolicy::for_attempts(2).max_attempts, 2);
        assert_eq!(RetryPolicy::default().delay, Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, TestError> = fast(5)
            .run(
                &CallContext::background(),
                |attempt| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if attempt < 3 {
                            Err(TestError::Transient)
                        } else {
                            Ok(attempt)
                        }
                    }
                },
                |e| *e == TestError::Transient,
            )
            .await;
        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), TestError> = fast(4)
            .run(
                &CallContext::background(),
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err(TestError::Transient) }
                },
                |e| *e == TestError::Transient,
            )
            .await;
        assert_eq!(result, Err(TestError::Transient));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_fatal_error_stops_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), TestError> = fast(4)
            .run(
                &CallContext::background(),
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err(TestError::Fatal) }
                },
                |e| *e == TestError::Transient,
            )
            .await;
        assert_eq!(result, Err(TestError::Fatal));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_deadline_during_delay_stops_loop() {
        let calls = AtomicU32::new(0);
        let ctx = CallContext::background().with_timeout(Duration::from_millis(30));
        let policy = RetryPolicy::for_attempts(100).with_delay(Duration::from_millis(200));
        let started = std::time::Instant::now();
        let result: Result<(), TestError> = policy
            .run(
                &ctx,
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err(TestError::Transient) }
                },
                |e| *e == TestError::Transient,
            )
            .await;
        assert_eq!(result, Err(TestError::Interrupted(Interrupted::DeadlineExceeded)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_cancelled_context_never_runs_operation() {
        let (ctx, handle) = CallContext::cancellable();
        handle.cancel();
        let calls = AtomicU32::new(0);
        let result: Result<(), TestError> = fast(3)
            .run(
                &ctx,
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok(()) }
                },
                |_| true,
            )
            .await;
        assert_eq!(result, Err(TestError::Interrupted(Interrupted::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
