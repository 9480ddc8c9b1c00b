// ABOUTME: Service group control through the compose command-line tooling.
// ABOUTME: Runs `<runtime> compose up -d` / `stop` for a group's services from the project directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use super::traits::{GroupError, GroupOps};
use crate::host::{HostCommand, HostRunner};
use crate::sequencer::ServiceGroup;

/// Drives service groups with `docker compose` (or `podman compose`).
#[derive(Clone)]
pub struct ComposeCli {
    runner: Arc<dyn HostRunner>,
    program: Vec<String>,
    project_dir: PathBuf,
    compose_file: PathBuf,
}

impl ComposeCli {
    /// `program` is the command prefix, e.g. `["docker", "compose"]`.
    pub fn new(
        runner: Arc<dyn HostRunner>,
        program: Vec<String>,
        project_dir: &Path,
        compose_file: &Path,
    ) -> Self {
        Self {
            runner,
            program,
            project_dir: project_dir.to_path_buf(),
            compose_file: compose_file.to_path_buf(),
        }
    }

    /// The command run for a compose subcommand on a group.
    pub fn command(&self, subcommand: &[&str], group: &ServiceGroup) -> Result<HostCommand, GroupError> {
        let base = HostCommand::from_argv(&self.program)
            .ok_or_else(|| GroupError::MissingTool("compose command is empty".to_string()))?;
        Ok(base
            .arg("-f")
            .arg(self.compose_file.display().to_string())
            .args(subcommand.iter().copied())
            .args(group.services.iter().cloned())
            .current_dir(&self.project_dir))
    }

    async fn run(&self, subcommand: &[&str], group: &ServiceGroup) -> Result<(), GroupError> {
        let command = self.command(subcommand, group)?;
        tracing::debug!(group = %group.name, command = %command, "running compose");
        self.runner.run(&command).await?;
        Ok(())
    }
}

#[async_trait]
impl GroupOps for ComposeCli {
    async fn start_group(&self, group: &ServiceGroup) -> Result<(), GroupError> {
        // `up -d` leaves already-running, unchanged containers alone
        self.run(&["up", "-d"], group).await
    }

    async fn stop_group(&self, group: &ServiceGroup) -> Result<(), GroupError> {
        self.run(&["stop"], group).await
    }
}
