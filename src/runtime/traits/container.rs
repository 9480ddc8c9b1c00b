// ABOUTME: Container inspection trait for container runtimes.
// ABOUTME: Reports lifecycle state and health verdict for a named container.

use super::shared_types::ContainerInfo;
use crate::types::ContainerName;
use async_trait::async_trait;

/// Read-only container operations used by health probing.
#[async_trait]
pub trait ContainerOps: Send + Sync {
    /// Get state and health information about a container.
    ///
    /// Returns `ContainerError::NotFound` when no container has that name.
    async fn inspect_container(&self, name: &ContainerName)
    -> Result<ContainerInfo, ContainerError>;
}

/// Errors from container operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("container not found: {0}")]
    NotFound(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
