// ABOUTME: Service group start/stop trait.
// ABOUTME: Groups are started and stopped as a unit through the compose tooling.

use crate::host::HostCommandError;
use crate::sequencer::ServiceGroup;
use async_trait::async_trait;

/// Start and stop a declared service group.
///
/// Starting a group whose containers already run must succeed without
/// recreating them.
#[async_trait]
pub trait GroupOps: Send + Sync {
    /// Start every service in the group and return once the start command has.
    async fn start_group(&self, group: &ServiceGroup) -> Result<(), GroupError>;

    /// Stop every service in the group.
    async fn stop_group(&self, group: &ServiceGroup) -> Result<(), GroupError>;
}

/// Errors from group operations.
#[derive(Debug, thiserror::Error)]
pub enum GroupError {
    #[error("missing dependency: {0}")]
    MissingTool(String),

    #[error(transparent)]
    Command(HostCommandError),
}

impl From<HostCommandError> for GroupError {
    fn from(e: HostCommandError) -> Self {
        match e {
            HostCommandError::MissingTool(tool) => GroupError::MissingTool(tool),
            other => GroupError::Command(other),
        }
    }
}
