// ABOUTME: Stage transition methods for the deploy pipeline.
// ABOUTME: Each method consumes self and returns the next state, or the finished run on failure.

use super::Deploy;
use super::context::DeployContext;
use super::error::StageError;
use super::preflight;
use super::report::{DeployRun, Stage, StageOutcome};
use super::setup::run_setup;
use super::state::{Bootstrapped, Certified, Configured, Ready, SetUp, Started, Validated};
use super::DeployRequest;

/// Next state on success; the finished run, with the failure recorded, otherwise.
pub type StageResult<'a, T> = Result<Deploy<'a, T>, DeployRun>;

// =============================================================================
// Internal Helpers
// =============================================================================

impl<'a, S> Deploy<'a, S> {
    fn advance<T>(mut self, stage: Stage, outcome: StageOutcome, state: T) -> Deploy<'a, T> {
        tracing::info!(%stage, %outcome, "stage finished");
        self.run.record(stage, outcome);
        Deploy {
            ctx: self.ctx,
            request: self.request,
            run: self.run,
            state,
        }
    }

    fn fail(mut self, stage: Stage, error: StageError) -> DeployRun {
        match &error {
            StageError::Cancelled => tracing::warn!(%stage, "stage cancelled"),
            e => tracing::error!(%stage, kind = %e.kind(), error = %e, "stage failed"),
        }
        self.run.record(stage, StageOutcome::from_error(&error));
        self.run
    }

    fn begin(&self, stage: Stage) -> Result<(), StageError> {
        if self.ctx.cancel.is_cancelled() {
            return Err(StageError::Cancelled);
        }
        tracing::info!(%stage, mode = %self.request.mode, domain = %self.request.domain, "stage started");
        Ok(())
    }
}

// =============================================================================
// Configured -> SetUp
// =============================================================================

impl<'a> Deploy<'a, Configured> {
    pub async fn setup(self) -> StageResult<'a, SetUp> {
        let stage = Stage::Setup;
        if let Err(e) = self.begin(stage) {
            return Err(self.fail(stage, e));
        }
        match run_setup(&self.ctx.config, self.ctx.runner.as_ref(), &self.request).await {
            Ok(()) => Ok(self.advance(stage, StageOutcome::Succeeded, SetUp)),
            Err(e) => Err(self.fail(stage, e)),
        }
    }
}

// =============================================================================
// SetUp -> Validated
// =============================================================================

impl<'a> Deploy<'a, SetUp> {
    pub async fn validate(self) -> StageResult<'a, Validated> {
        let stage = Stage::Validate;
        if let Err(e) = self.begin(stage) {
            return Err(self.fail(stage, e));
        }
        match preflight::validate(self.ctx, &self.request).await {
            Ok(()) => Ok(self.advance(stage, StageOutcome::Succeeded, Validated)),
            Err(e) => Err(self.fail(stage, e)),
        }
    }
}

// =============================================================================
// Validated -> Started
// =============================================================================

impl<'a> Deploy<'a, Validated> {
    /// Ensure shared networks and volumes exist, then bring the groups up in order.
    pub async fn start(self) -> StageResult<'a, Started> {
        let stage = Stage::Start;
        if let Err(e) = self.begin(stage) {
            return Err(self.fail(stage, e));
        }
        match self.ctx.sequencer.bring_up(&self.ctx.cancel).await {
            Ok(()) => Ok(self.advance(stage, StageOutcome::Succeeded, Started)),
            Err(e) => Err(self.fail(stage, e.into())),
        }
    }
}

// =============================================================================
// Started -> Ready
// =============================================================================

impl<'a> Deploy<'a, Started> {
    pub async fn await_ready(self) -> StageResult<'a, Ready> {
        let stage = Stage::Ready;
        if let Err(e) = self.begin(stage) {
            return Err(self.fail(stage, e));
        }
        let readiness = &self.ctx.config.readiness;
        let result = self
            .ctx
            .gate
            .await_healthy(
                &readiness.containers,
                readiness.timeout,
                readiness.interval,
                &self.ctx.cancel,
            )
            .await;

        match result {
            Ok(ready) => {
                let mut next = self.advance(
                    stage,
                    StageOutcome::Succeeded,
                    Ready {
                        snapshot: ready.snapshot,
                        polls: ready.polls,
                    },
                );
                next.run.readiness_polls = Some(ready.polls);
                Ok(next)
            }
            Err(e) => Err(self.fail(stage, e.into())),
        }
    }
}

// =============================================================================
// Ready -> Bootstrapped
// =============================================================================

impl<'a> Deploy<'a, Ready> {
    pub async fn bootstrap(self) -> StageResult<'a, Bootstrapped> {
        let stage = Stage::Bootstrap;
        if let Err(e) = self.begin(stage) {
            return Err(self.fail(stage, e));
        }
        match self.ctx.bootstrapper.run(&self.ctx.cancel).await {
            Ok(retried) => {
                let mut next = self.advance(
                    stage,
                    StageOutcome::Succeeded,
                    Bootstrapped {
                        attempts: retried.attempts,
                    },
                );
                next.run.bootstrap_attempts = Some(retried.attempts);
                Ok(next)
            }
            Err(e) => Err(self.fail(stage, e.into())),
        }
    }
}

// =============================================================================
// Bootstrapped -> Certified
// =============================================================================

impl<'a> Deploy<'a, Bootstrapped> {
    /// Issue and sync public certificates. Development runs skip this stage.
    pub async fn certificates(self) -> StageResult<'a, Certified> {
        let stage = Stage::Certificates;
        if let Err(e) = self.begin(stage) {
            return Err(self.fail(stage, e));
        }
        if !self.request.mode.is_production() {
            return Ok(self.advance(stage, StageOutcome::Skipped, Certified::default()));
        }

        match self.ctx.certificates.issue(&self.request.domain).await {
            Ok(report) => {
                let mut next = self.advance(
                    stage,
                    StageOutcome::Succeeded,
                    Certified {
                        issued: Some(report.clone()),
                    },
                );
                next.run.certificate = Some(report);
                Ok(next)
            }
            Err(e) => Err(self.fail(stage, e.into())),
        }
    }
}

// =============================================================================
// Certified -> DeployRun
// =============================================================================

impl Deploy<'_, Certified> {
    pub fn finish(self) -> DeployRun {
        tracing::info!(
            mode = %self.request.mode,
            domain = %self.request.domain,
            status = %self.run.final_status(),
            "deploy finished"
        );
        self.run
    }
}

async fn drive<'a>(deploy: Deploy<'a, Configured>) -> StageResult<'a, Certified> {
    deploy
        .setup()
        .await?
        .validate()
        .await?
        .start()
        .await?
        .await_ready()
        .await?
        .bootstrap()
        .await?
        .certificates()
        .await
}

/// Run every stage in order and return the record of the run.
pub async fn run_deploy(ctx: &DeployContext, request: DeployRequest) -> DeployRun {
    match drive(Deploy::new(ctx, request)).await {
        Ok(deploy) => deploy.finish(),
        Err(run) => run,
    }
}
