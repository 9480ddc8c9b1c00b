// ABOUTME: Readiness gate that waits for a fixed set of containers to report healthy.
// ABOUTME: Polls at a constant interval under a monotonic deadline and keeps the last snapshot.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::health::{HealthProber, HealthSnapshot};
use crate::retry::{RetryError, RetryPolicy, RetryPolicyError};
use crate::runtime::ContainerError;
use crate::types::ContainerName;

#[derive(Debug, thiserror::Error)]
pub enum ReadinessError {
    #[error("containers not healthy after {timeout:?}: {snapshot}")]
    Timeout {
        timeout: Duration,
        polls: u32,
        snapshot: HealthSnapshot,
    },

    #[error("cancelled after {polls} polls")]
    Cancelled { polls: u32 },

    #[error("failed to read container health: {0}")]
    Runtime(#[from] ContainerError),

    #[error(transparent)]
    Policy(#[from] RetryPolicyError),
}

/// Outcome of a gate that went green.
#[derive(Debug, Clone)]
pub struct Ready {
    pub snapshot: HealthSnapshot,
    pub polls: u32,
}

pub struct ReadinessGate {
    prober: HealthProber,
}

impl ReadinessGate {
    pub fn new(prober: HealthProber) -> Self {
        Self { prober }
    }

    /// Poll `containers` every `interval` until all are healthy or `timeout` elapses.
    ///
    /// A green first poll returns without sleeping. Runtime errors end the wait
    /// immediately instead of being retried.
    pub async fn await_healthy(
        &self,
        containers: &[ContainerName],
        timeout: Duration,
        interval: Duration,
        cancel: &CancellationToken,
    ) -> Result<Ready, ReadinessError> {
        let policy = RetryPolicy::within(timeout, interval)?;
        let deadline = Instant::now() + timeout;
        tracing::info!(
            containers = containers.len(),
            timeout = ?timeout,
            "waiting for containers to become healthy"
        );

        let result = policy
            .run_until(deadline, cancel, |poll| async move {
                match self.prober.snapshot(containers).await {
                    Ok(snapshot) if snapshot.all_healthy() => Ok(Ok(snapshot)),
                    Ok(snapshot) => {
                        tracing::debug!(poll, %snapshot, "not ready yet");
                        Err(snapshot)
                    }
                    Err(e) => Ok(Err(e)),
                }
            })
            .await;

        match result {
            Ok(retried) => {
                let snapshot = retried.value?;
                tracing::info!(polls = retried.attempts, "all containers healthy");
                Ok(Ready {
                    snapshot,
                    polls: retried.attempts,
                })
            }
            Err(RetryError::Exhausted { attempts, last }) => Err(ReadinessError::Timeout {
                timeout,
                polls: attempts,
                snapshot: last,
            }),
            Err(RetryError::Cancelled { attempts }) => {
                Err(ReadinessError::Cancelled { polls: attempts })
            }
        }
    }
}
