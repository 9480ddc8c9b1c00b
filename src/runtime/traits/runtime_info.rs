// ABOUTME: Runtime reachability and identity.
// ABOUTME: Validate pings the runtime before any container is started.

use super::shared_types::RuntimeMetadata;
use async_trait::async_trait;

#[async_trait]
pub trait RuntimeInfo: Send + Sync {
    /// Name, version and platform of the runtime behind the socket.
    async fn info(&self) -> Result<RuntimeMetadata, RuntimeInfoError>;

    /// Fails when the runtime does not answer.
    async fn ping(&self) -> Result<(), RuntimeInfoError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeInfoError {
    #[error("cannot reach the container runtime: {0}")]
    ConnectionFailed(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
