// ABOUTME: Network operations trait for container runtimes.
// ABOUTME: Existence checks and creation for the stack's shared networks.

use super::shared_types::NetworkConfig;
use crate::types::NetworkId;
use async_trait::async_trait;

#[async_trait]
pub trait NetworkOps: Send + Sync {
    /// Create a bridge network. Fails with `AlreadyExists` if the name is taken.
    async fn create_network(&self, config: &NetworkConfig) -> Result<NetworkId, NetworkError>;

    async fn network_exists(&self, name: &str) -> Result<bool, NetworkError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("network already exists: {0}")]
    AlreadyExists(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
