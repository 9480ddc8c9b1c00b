// ABOUTME: Idempotent create-if-missing for runtime resources and certificate material.
// ABOUTME: A creation race that ends in "already exists" counts as success.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;

use crate::runtime::{NetworkConfig, NetworkError, NetworkOps, VolumeConfig, VolumeError, VolumeOps};

/// Whether `ensure_exists` found the resource or had to create it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensured {
    Existing,
    Created,
}

impl fmt::Display for Ensured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ensured::Existing => write!(f, "existing"),
            Ensured::Created => write!(f, "created"),
        }
    }
}

/// Failure from a create call.
#[derive(Debug)]
pub enum CreateError<E> {
    /// Someone else created the resource between the existence check and the create.
    AlreadyExists,
    Failed(E),
}

/// A resource that can be checked for and created.
#[async_trait]
pub trait Ensurable: Send + Sync {
    type Error: Send;

    /// Human-readable name for logs.
    fn describe(&self) -> String;

    async fn exists(&self) -> Result<bool, Self::Error>;

    async fn create(&self) -> Result<(), CreateError<Self::Error>>;
}

pub async fn ensure_exists<R>(resource: &R) -> Result<Ensured, R::Error>
where
    R: Ensurable + ?Sized,
{
    if resource.exists().await? {
        tracing::debug!(resource = %resource.describe(), "already exists");
        return Ok(Ensured::Existing);
    }

    match resource.create().await {
        Ok(()) => {
            tracing::info!(resource = %resource.describe(), "created");
            Ok(Ensured::Created)
        }
        Err(CreateError::AlreadyExists) => {
            tracing::debug!(resource = %resource.describe(), "created concurrently");
            Ok(Ensured::Existing)
        }
        Err(CreateError::Failed(e)) => Err(e),
    }
}

/// A named container network.
pub struct Network<'a> {
    ops: &'a dyn NetworkOps,
    config: NetworkConfig,
}

impl<'a> Network<'a> {
    pub fn new(ops: &'a dyn NetworkOps, name: &str) -> Self {
        Self {
            ops,
            config: NetworkConfig {
                name: name.to_string(),
                labels: managed_labels(),
            },
        }
    }
}

#[async_trait]
impl Ensurable for Network<'_> {
    type Error = NetworkError;

    fn describe(&self) -> String {
        format!("network {}", self.config.name)
    }

    async fn exists(&self) -> Result<bool, NetworkError> {
        self.ops.network_exists(&self.config.name).await
    }

    async fn create(&self) -> Result<(), CreateError<NetworkError>> {
        match self.ops.create_network(&self.config).await {
            Ok(id) => {
                tracing::debug!(network = %self.config.name, %id, "network created");
                Ok(())
            }
            Err(NetworkError::AlreadyExists(_)) => Err(CreateError::AlreadyExists),
            Err(e) => Err(CreateError::Failed(e)),
        }
    }
}

/// A named container volume.
pub struct Volume<'a> {
    ops: &'a dyn VolumeOps,
    config: VolumeConfig,
}

impl<'a> Volume<'a> {
    pub fn new(ops: &'a dyn VolumeOps, name: &str) -> Self {
        Self {
            ops,
            config: VolumeConfig {
                name: name.to_string(),
                labels: managed_labels(),
            },
        }
    }
}

#[async_trait]
impl Ensurable for Volume<'_> {
    type Error = VolumeError;

    fn describe(&self) -> String {
        format!("volume {}", self.config.name)
    }

    async fn exists(&self) -> Result<bool, VolumeError> {
        self.ops.volume_exists(&self.config.name).await
    }

    async fn create(&self) -> Result<(), CreateError<VolumeError>> {
        match self.ops.create_volume(&self.config).await {
            Ok(id) => {
                tracing::debug!(volume = %self.config.name, %id, "volume created");
                Ok(())
            }
            Err(VolumeError::AlreadyExists(_)) => Err(CreateError::AlreadyExists),
            Err(e) => Err(CreateError::Failed(e)),
        }
    }
}

fn managed_labels() -> HashMap<String, String> {
    HashMap::from([("stackward.managed".to_string(), "true".to_string())])
}
