// ABOUTME: Configuration reloads for the reverse proxy and the message server.
// ABOUTME: A reload is a command exec'd in the running container, never a restart.

use async_trait::async_trait;
use std::sync::Arc;

use crate::runtime::{ExecConfig, ExecOps};
use crate::types::ContainerName;

#[derive(Debug, thiserror::Error)]
#[error("{detail}")]
pub struct ReloadError {
    pub detail: String,
}

#[async_trait]
pub trait Reload: Send + Sync {
    /// Name of the reloaded service, for messages.
    fn target(&self) -> &str;

    async fn reload(&self) -> Result<(), ReloadError>;
}

/// Reload by running `command` inside `container`.
pub struct ExecReload {
    exec: Arc<dyn ExecOps>,
    container: ContainerName,
    command: Vec<String>,
}

impl ExecReload {
    pub fn new(exec: Arc<dyn ExecOps>, container: ContainerName, command: Vec<String>) -> Self {
        Self {
            exec,
            container,
            command,
        }
    }
}

#[async_trait]
impl Reload for ExecReload {
    fn target(&self) -> &str {
        self.container.as_str()
    }

    async fn reload(&self) -> Result<(), ReloadError> {
        tracing::info!(container = %self.container, command = ?self.command, "reloading");
        let result = self
            .exec
            .exec(&self.container, &ExecConfig::command(self.command.iter().cloned()))
            .await
            .map_err(|e| ReloadError {
                detail: e.to_string(),
            })?;

        if result.success() {
            Ok(())
        } else {
            Err(ReloadError {
                detail: format!(
                    "`{}` exited with {}: {}",
                    self.command.join(" "),
                    result.exit_code,
                    result.stderr_lossy().trim()
                ),
            })
        }
    }
}
