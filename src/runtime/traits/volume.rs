// ABOUTME: Volume operations trait for container runtimes.
// ABOUTME: Existence checks and creation for named volumes.

use super::shared_types::VolumeConfig;
use crate::types::VolumeId;
use async_trait::async_trait;

/// Named volume operations: check and create.
#[async_trait]
pub trait VolumeOps: Send + Sync {
    /// Create a named volume.
    async fn create_volume(&self, config: &VolumeConfig) -> Result<VolumeId, VolumeError>;

    /// Check if a named volume exists.
    async fn volume_exists(&self, name: &str) -> Result<bool, VolumeError>;
}

/// Errors from volume operations.
#[derive(Debug, thiserror::Error)]
pub enum VolumeError {
    #[error("volume already exists: {0}")]
    AlreadyExists(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
