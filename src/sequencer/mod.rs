// ABOUTME: Ordered start, stop and restart of the stack's service groups.
// ABOUTME: Groups come up strictly in order and go down in exact reverse order.

mod ensure;
mod group;

pub use ensure::{CreateError, Ensurable, Ensured, Network, Volume, ensure_exists};
pub use group::ServiceGroup;

use std::sync::Arc;

use nonempty::NonEmpty;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::health::{HealthProber, HealthSnapshot};
use crate::runtime::{
    ContainerError, ContainerOps, GroupError, GroupOps, NetworkError, NetworkOps, VolumeError,
    VolumeOps,
};
use crate::types::GroupName;

#[derive(Debug, thiserror::Error)]
pub enum SequencerError {
    #[error("failed to start group {group}: {source}")]
    Start {
        group: GroupName,
        #[source]
        source: GroupError,
    },

    #[error("failed to stop group {group}: {source}")]
    Stop {
        group: GroupName,
        #[source]
        source: GroupError,
    },

    #[error("unknown service group: {name} (declared: {declared})")]
    UnknownGroup { name: String, declared: String },

    #[error("failed to read health of group {group}: {source}")]
    Health {
        group: GroupName,
        #[source]
        source: ContainerError,
    },

    #[error("failed to ensure network {name}: {source}")]
    Network {
        name: String,
        #[source]
        source: NetworkError,
    },

    #[error("failed to ensure volume {name}: {source}")]
    Volume {
        name: String,
        #[source]
        source: VolumeError,
    },

    #[error("cancelled before group {next}")]
    Cancelled { next: GroupName },
}

/// Health of one group, as reported by `status`.
#[derive(Debug, Clone, Serialize)]
pub struct GroupStatus {
    pub group: GroupName,
    pub position: usize,
    pub snapshot: HealthSnapshot,
}

impl GroupStatus {
    pub fn healthy(&self) -> bool {
        self.snapshot.all_healthy()
    }
}

/// Networks and volumes the groups share, created before the first group starts.
pub struct SharedResources {
    pub networks: Arc<dyn NetworkOps>,
    pub volumes: Arc<dyn VolumeOps>,
    pub network_names: Vec<String>,
    pub volume_names: Vec<String>,
}

pub struct Sequencer {
    groups: NonEmpty<ServiceGroup>,
    ops: Arc<dyn GroupOps>,
    prober: HealthProber,
    shared: Option<SharedResources>,
}

impl Sequencer {
    pub fn new(groups: NonEmpty<ServiceGroup>, ops: Arc<dyn GroupOps>, prober: HealthProber) -> Self {
        Self {
            groups,
            ops,
            prober,
            shared: None,
        }
    }

    /// The configured groups, networks and volumes, all served by `runtime`.
    pub fn from_config<R>(config: &Config, ops: Arc<dyn GroupOps>, runtime: Arc<R>) -> Self
    where
        R: ContainerOps + NetworkOps + VolumeOps + 'static,
    {
        Self::new(
            config.service_groups(),
            ops,
            HealthProber::new(runtime.clone()),
        )
        .with_shared_resources(SharedResources {
            networks: runtime.clone(),
            volumes: runtime,
            network_names: config.networks.clone(),
            volume_names: config.volumes.clone(),
        })
    }

    pub fn with_shared_resources(mut self, shared: SharedResources) -> Self {
        self.shared = Some(shared);
        self
    }

    pub fn groups(&self) -> &NonEmpty<ServiceGroup> {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&ServiceGroup> {
        self.groups.iter().find(|g| g.name.as_str() == name)
    }

    /// Start every group in order. Each start returns before the next begins;
    /// the first failure aborts and names the group.
    pub async fn bring_up(&self, cancel: &CancellationToken) -> Result<(), SequencerError> {
        if cancel.is_cancelled() {
            return Err(SequencerError::Cancelled {
                next: self.groups.head.name.clone(),
            });
        }
        self.ensure_shared().await?;

        for group in self.groups.iter() {
            if cancel.is_cancelled() {
                return Err(SequencerError::Cancelled {
                    next: group.name.clone(),
                });
            }
            tracing::info!(group = %group.name, position = group.position, "starting group");
            self.ops
                .start_group(group)
                .await
                .map_err(|source| SequencerError::Start {
                    group: group.name.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Stop every group in exact reverse order.
    pub async fn tear_down(&self) -> Result<(), SequencerError> {
        let ordered: Vec<&ServiceGroup> = self.groups.iter().collect();
        for group in ordered.into_iter().rev() {
            tracing::info!(group = %group.name, position = group.position, "stopping group");
            self.ops
                .stop_group(group)
                .await
                .map_err(|source| SequencerError::Stop {
                    group: group.name.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Stop then start one declared group. Other groups are untouched.
    pub async fn restart(&self, name: &str) -> Result<(), SequencerError> {
        let group = self
            .group(name)
            .ok_or_else(|| SequencerError::UnknownGroup {
                name: name.to_string(),
                declared: self.declared_names(),
            })?;

        tracing::info!(group = %group.name, "restarting group");
        self.ops
            .stop_group(group)
            .await
            .map_err(|source| SequencerError::Stop {
                group: group.name.clone(),
                source,
            })?;
        self.ops
            .start_group(group)
            .await
            .map_err(|source| SequencerError::Start {
                group: group.name.clone(),
                source,
            })
    }

    /// Current health of each group's containers, in start order.
    pub async fn status(&self) -> Result<Vec<GroupStatus>, SequencerError> {
        let mut statuses = Vec::with_capacity(self.groups.len());
        for group in self.groups.iter() {
            let snapshot = self
                .prober
                .snapshot(&group.containers)
                .await
                .map_err(|source| SequencerError::Health {
                    group: group.name.clone(),
                    source,
                })?;
            statuses.push(GroupStatus {
                group: group.name.clone(),
                position: group.position,
                snapshot,
            });
        }
        Ok(statuses)
    }

    async fn ensure_shared(&self) -> Result<(), SequencerError> {
        let Some(shared) = &self.shared else {
            return Ok(());
        };
        for name in &shared.network_names {
            let ensured = ensure_exists(&Network::new(shared.networks.as_ref(), name))
                .await
                .map_err(|source| SequencerError::Network {
                    name: name.clone(),
                    source,
                })?;
            tracing::debug!(network = %name, %ensured, "network ensured");
        }
        for name in &shared.volume_names {
            let ensured = ensure_exists(&Volume::new(shared.volumes.as_ref(), name))
                .await
                .map_err(|source| SequencerError::Volume {
                    name: name.clone(),
                    source,
                })?;
            tracing::debug!(volume = %name, %ensured, "volume ensured");
        }
        Ok(())
    }

    fn declared_names(&self) -> String {
        self.groups
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
