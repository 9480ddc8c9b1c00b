// ABOUTME: Bounded fixed-delay retry policy shared by the readiness gate and the bootstrap retrier.
// ABOUTME: Waits run on tokio's monotonic clock and end early when the cancellation token fires.

use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Maximum attempts and the fixed delay between them.
///
/// Total time spent waiting is bounded by `max_attempts * delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: NonZeroU32,
    delay: Duration,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RetryPolicyError {
    #[error("retry policy needs at least one attempt")]
    ZeroAttempts,

    #[error("poll interval must be greater than zero")]
    ZeroInterval,
}

/// A successful result and how many invocations it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retried<T> {
    pub value: T,
    pub attempts: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },

    #[error("cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Result<Self, RetryPolicyError> {
        let max_attempts = NonZeroU32::new(max_attempts).ok_or(RetryPolicyError::ZeroAttempts)?;
        Ok(Self {
            max_attempts,
            delay,
        })
    }

    /// Policy that polls every `interval` for at most `timeout`.
    ///
    /// The attempt count is `ceil(timeout / interval)`, never less than one.
    pub fn within(timeout: Duration, interval: Duration) -> Result<Self, RetryPolicyError> {
        if interval.is_zero() {
            return Err(RetryPolicyError::ZeroInterval);
        }
        let attempts = timeout.as_nanos().div_ceil(interval.as_nanos()).max(1);
        let attempts = u32::try_from(attempts).unwrap_or(u32::MAX);
        Self::new(attempts, interval)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.get()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Upper bound on time spent between attempts.
    pub fn budget(&self) -> Duration {
        self.delay.saturating_mul(self.max_attempts.get())
    }

    /// Invoke `op` until it succeeds or attempts run out, sleeping `delay`
    /// between attempts but never after the last one.
    pub async fn run<T, E, F, Fut>(
        &self,
        cancel: &CancellationToken,
        op: F,
    ) -> Result<Retried<T>, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.drive(None, cancel, op).await
    }

    /// Invoke `op` until it succeeds, attempts run out, or `deadline` passes.
    ///
    /// Sleeps after every miss (clamped to the deadline), so a policy built
    /// with `within(timeout, interval)` gives up once `timeout` has elapsed.
    pub async fn run_until<T, E, F, Fut>(
        &self,
        deadline: Instant,
        cancel: &CancellationToken,
        op: F,
    ) -> Result<Retried<T>, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.drive(Some(deadline), cancel, op).await
    }

    async fn drive<T, E, F, Fut>(
        &self,
        deadline: Option<Instant>,
        cancel: &CancellationToken,
        mut op: F,
    ) -> Result<Retried<T>, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max = self.max_attempts.get();
        let mut attempt = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(RetryError::Cancelled { attempts: attempt });
            }

            attempt += 1;
            let last = match op(attempt).await {
                Ok(value) => {
                    return Ok(Retried {
                        value,
                        attempts: attempt,
                    });
                }
                Err(e) => e,
            };
            tracing::debug!(attempt, max, "attempt failed");

            let wake = match deadline {
                None if attempt >= max => {
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last,
                    });
                }
                None => Instant::now() + self.delay,
                Some(deadline) => (Instant::now() + self.delay).min(deadline),
            };

            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(RetryError::Cancelled { attempts: attempt });
                }
                _ = tokio::time::sleep_until(wake) => {}
            }

            if let Some(deadline) = deadline
                && (attempt >= max || Instant::now() >= deadline)
            {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(attempts: u32, secs: u64) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_secs(secs)).unwrap()
    }

    #[test]
    fn zero_attempts_rejected() {
        assert_eq!(
            RetryPolicy::new(0, Duration::from_secs(1)),
            Err(RetryPolicyError::ZeroAttempts)
        );
    }

    #[test]
    fn within_rounds_attempts_up() {
        let p = RetryPolicy::within(Duration::from_secs(120), Duration::from_secs(5)).unwrap();
        assert_eq!(p.max_attempts(), 24);
        assert_eq!(p.budget(), Duration::from_secs(120));

        let p = RetryPolicy::within(Duration::from_secs(7), Duration::from_secs(5)).unwrap();
        assert_eq!(p.max_attempts(), 2);

        let p = RetryPolicy::within(Duration::ZERO, Duration::from_secs(5)).unwrap();
        assert_eq!(p.max_attempts(), 1);
    }

    #[test]
    fn within_rejects_zero_interval() {
        assert_eq!(
            RetryPolicy::within(Duration::from_secs(1), Duration::ZERO),
            Err(RetryPolicyError::ZeroInterval)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn first_success_does_not_sleep() {
        let start = Instant::now();
        let result: Result<_, RetryError<&str>> = policy(3, 10)
            .run(&CancellationToken::new(), |_| async { Ok(7) })
            .await;

        let retried = result.unwrap();
        assert_eq!(retried.value, 7);
        assert_eq!(retried.attempts, 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_does_not_sleep_after_last_attempt() {
        let start = Instant::now();
        let result: Result<Retried<()>, _> = policy(3, 10)
            .run(&CancellationToken::new(), |n| async move {
                Err(format!("failure {}", n))
            })
            .await;

        match result {
            Err(RetryError::Exhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last, "failure 3");
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_sleep_reports_cancelled() {
        let cancel = CancellationToken::new();
        let calls = Arc::new(AtomicU32::new(0));

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            trigger.cancel();
        });

        let counter = calls.clone();
        let result: Result<Retried<()>, RetryError<()>> = policy(5, 10)
            .run(&cancel, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(()) }
            })
            .await;

        assert!(matches!(result, Err(RetryError::Cancelled { attempts: 1 })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_token_prevents_first_attempt() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let calls = AtomicU32::new(0);
        let result: Result<Retried<()>, RetryError<()>> = policy(5, 10)
            .run(&cancel, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(()) }
            })
            .await;

        assert!(matches!(result, Err(RetryError::Cancelled { attempts: 0 })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn run_until_stops_at_deadline() {
        let start = Instant::now();
        let p = RetryPolicy::within(Duration::from_secs(7), Duration::from_secs(5)).unwrap();

        let result: Result<Retried<()>, RetryError<()>> = p
            .run_until(
                start + Duration::from_secs(7),
                &CancellationToken::new(),
                |_| async { Err(()) },
            )
            .await;

        assert!(matches!(
            result,
            Err(RetryError::Exhausted { attempts: 2, .. })
        ));
        assert_eq!(start.elapsed(), Duration::from_secs(7));
    }
}
