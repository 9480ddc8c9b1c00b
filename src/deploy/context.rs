// ABOUTME: Collaborators shared by every deploy stage.
// ABOUTME: Built once per invocation from the Config and the connected runtime.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::error::StageError;
use crate::bootstrap::Bootstrapper;
use crate::certificates::CertificateManager;
use crate::config::Config;
use crate::health::HealthProber;
use crate::host::{HostCommand, HostRunner};
use crate::readiness::ReadinessGate;
use crate::retry::RetryPolicy;
use crate::runtime::{ContainerOps, GroupOps, NetworkOps, RuntimeInfo, VolumeOps};
use crate::sequencer::Sequencer;

pub struct DeployContext {
    pub(crate) config: Config,
    pub(crate) compose_program: String,
    pub(crate) runner: Arc<dyn HostRunner>,
    pub(crate) runtime: Arc<dyn RuntimeInfo>,
    pub(crate) sequencer: Sequencer,
    pub(crate) gate: ReadinessGate,
    pub(crate) bootstrapper: Bootstrapper,
    pub(crate) certificates: CertificateManager,
    pub(crate) cancel: CancellationToken,
}

impl DeployContext {
    pub fn new<R>(
        config: Config,
        runtime: Arc<R>,
        groups: Arc<dyn GroupOps>,
        runner: Arc<dyn HostRunner>,
        certificates: CertificateManager,
        cancel: CancellationToken,
    ) -> Result<Self, StageError>
    where
        R: ContainerOps + NetworkOps + VolumeOps + RuntimeInfo + 'static,
    {
        let command = HostCommand::from_argv(&config.bootstrap.command)
            .ok_or_else(|| StageError::Usage("bootstrap.command cannot be empty".to_string()))?
            .current_dir(&config.project_dir);
        let policy = RetryPolicy::new(config.bootstrap.attempts, config.bootstrap.delay)
            .map_err(|e| StageError::Usage(format!("bootstrap: {}", e)))?;

        let prober = HealthProber::new(runtime.clone());
        Ok(Self {
            compose_program: "docker".to_string(),
            sequencer: Sequencer::from_config(&config, groups, runtime.clone()),
            gate: ReadinessGate::new(prober),
            bootstrapper: Bootstrapper::new(runner.clone(), command, policy),
            runtime,
            config,
            runner,
            certificates,
            cancel,
        })
    }

    /// Binary that compose commands run through; probed during validate.
    pub fn with_compose_program(mut self, program: impl Into<String>) -> Self {
        self.compose_program = program.into();
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn certificates(&self) -> &CertificateManager {
        &self.certificates
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }
}
