// ABOUTME: Tri-state container health readings and point-in-time snapshots.
// ABOUTME: Probes every container of a snapshot concurrently through the runtime.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;

use crate::runtime::{ContainerError, ContainerInfo, ContainerOps, ContainerState, HealthState};
use crate::types::ContainerName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthReading {
    Healthy,
    Unhealthy,
    Absent,
}

impl HealthReading {
    /// Running containers without a healthcheck count as healthy.
    pub fn from_info(info: &ContainerInfo) -> Self {
        if info.state != ContainerState::Running {
            return HealthReading::Unhealthy;
        }
        match info.health {
            Some(HealthState::Healthy) | Some(HealthState::None) | None => HealthReading::Healthy,
            Some(HealthState::Starting) | Some(HealthState::Unhealthy) => {
                HealthReading::Unhealthy
            }
        }
    }
}

impl fmt::Display for HealthReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthReading::Healthy => write!(f, "healthy"),
            HealthReading::Unhealthy => write!(f, "unhealthy"),
            HealthReading::Absent => write!(f, "absent"),
        }
    }
}

/// Health of a set of containers at one instant. Never mutated after capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthSnapshot {
    readings: BTreeMap<ContainerName, HealthReading>,
    captured_at: DateTime<Utc>,
}

impl HealthSnapshot {
    pub fn new(readings: BTreeMap<ContainerName, HealthReading>) -> Self {
        Self {
            readings,
            captured_at: Utc::now(),
        }
    }

    pub fn readings(&self) -> &BTreeMap<ContainerName, HealthReading> {
        &self.readings
    }

    pub fn get(&self, name: &ContainerName) -> Option<HealthReading> {
        self.readings.get(name).copied()
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// True when every container is healthy. Absent counts as not healthy.
    pub fn all_healthy(&self) -> bool {
        self.readings
            .values()
            .all(|r| *r == HealthReading::Healthy)
    }

    /// Containers that are unhealthy or absent, in name order.
    pub fn not_healthy(&self) -> Vec<(&ContainerName, HealthReading)> {
        self.readings
            .iter()
            .filter(|(_, r)| **r != HealthReading::Healthy)
            .map(|(name, r)| (name, *r))
            .collect()
    }
}

impl fmt::Display for HealthSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .readings
            .iter()
            .map(|(name, reading)| format!("{}={}", name, reading))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Reads container health from the runtime.
#[derive(Clone)]
pub struct HealthProber {
    runtime: Arc<dyn ContainerOps>,
}

impl HealthProber {
    pub fn new(runtime: Arc<dyn ContainerOps>) -> Self {
        Self { runtime }
    }

    pub async fn probe(&self, name: &ContainerName) -> Result<HealthReading, ContainerError> {
        match self.runtime.inspect_container(name).await {
            Ok(info) => Ok(HealthReading::from_info(&info)),
            Err(ContainerError::NotFound(_)) => Ok(HealthReading::Absent),
            Err(e) => Err(e),
        }
    }

    /// Probe all `names` concurrently and capture the result.
    pub async fn snapshot(&self, names: &[ContainerName]) -> Result<HealthSnapshot, ContainerError> {
        let readings = join_all(names.iter().map(|name| async move {
            let reading = self.probe(name).await?;
            tracing::debug!(container = %name, %reading, "probed");
            Ok::<_, ContainerError>((name.clone(), reading))
        }))
        .await
        .into_iter()
        .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(HealthSnapshot::new(readings))
    }
}
