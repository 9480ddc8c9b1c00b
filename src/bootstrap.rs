// ABOUTME: Retries the idempotent identity-provider bootstrap under a bounded fixed-delay policy.
// ABOUTME: Every failure is retried alike until the attempt budget is spent.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::host::{HostCommand, HostCommandError, HostRunner};
use crate::retry::{RetryError, RetryPolicy, Retried};

/// Invoke `operation` up to `policy.max_attempts()` times, sleeping the policy
/// delay between attempts, and return the first success with its invocation count.
pub async fn run_with_retries<T, E, F, Fut>(
    operation: F,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<Retried<T>, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let result = policy.run(cancel, operation).await;
    match &result {
        Ok(retried) => tracing::info!(attempts = retried.attempts, "bootstrap succeeded"),
        Err(RetryError::Exhausted { attempts, last }) => {
            tracing::warn!(attempts, error = %last, "bootstrap attempts exhausted")
        }
        Err(RetryError::Cancelled { attempts }) => {
            tracing::warn!(attempts, "bootstrap cancelled")
        }
    }
    result
}

/// Runs the bootstrap host command; exit code 0 is success.
pub struct Bootstrapper {
    runner: Arc<dyn HostRunner>,
    command: HostCommand,
    policy: RetryPolicy,
}

impl Bootstrapper {
    pub fn new(runner: Arc<dyn HostRunner>, command: HostCommand, policy: RetryPolicy) -> Self {
        Self {
            runner,
            command,
            policy,
        }
    }

    pub fn command(&self) -> &HostCommand {
        &self.command
    }

    pub async fn run(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Retried<()>, RetryError<HostCommandError>> {
        tracing::info!(command = %self.command, max_attempts = self.policy.max_attempts(), "running bootstrap");
        run_with_retries(
            |attempt| async move {
                tracing::debug!(attempt, "bootstrap attempt");
                self.runner.run(&self.command).await.map(|_| ())
            },
            &self.policy,
            cancel,
        )
        .await
    }
}
