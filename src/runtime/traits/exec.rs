// ABOUTME: Exec operations trait for container runtimes.
// ABOUTME: Runs CA client and reload commands inside stack containers and reads files out of them.

use super::shared_types::{ExecConfig, ExecResult};
use crate::types::ContainerName;
use async_trait::async_trait;

#[async_trait]
pub trait ExecOps: Send + Sync {
    /// Run `config.cmd` in a running container and wait for it to exit.
    ///
    /// A non-zero exit is reported through `ExecResult`, not as an error.
    async fn exec(
        &self,
        container: &ContainerName,
        config: &ExecConfig,
    ) -> Result<ExecResult, ExecError>;

    /// Contents of `path` inside the container, following symlinks.
    /// `None` when the file cannot be read.
    async fn read_file(
        &self,
        container: &ContainerName,
        path: &str,
    ) -> Result<Option<Vec<u8>>, ExecError> {
        let result = self
            .exec(container, &ExecConfig::command(["cat", "--", path]))
            .await?;
        Ok(result.success().then_some(result.stdout))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("container not running: {0}")]
    ContainerNotRunning(String),

    #[error("exec failed: {0}")]
    Failed(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
