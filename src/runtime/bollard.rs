// ABOUTME: Bollard-backed container runtime for Docker and Podman sockets.
// ABOUTME: Health inspection, shared network/volume creation and exec for certbot and reloads.

use crate::runtime::traits::{
    ContainerError, ContainerInfo, ContainerOps, ContainerState, ExecConfig, ExecError, ExecOps,
    ExecResult, HealthState, NetworkConfig, NetworkError, NetworkOps, RuntimeInfo,
    RuntimeInfoError, RuntimeMetadata, VolumeConfig, VolumeError, VolumeOps,
};
use crate::runtime::types::{RuntimeEndpoint, RuntimeType};
use crate::types::{ContainerName, NetworkId, VolumeId};
use async_trait::async_trait;
use bollard::Docker;
use bollard::container::LogOutput;
use bollard::errors::Error as BollardError;
use bollard::exec::{StartExecOptions, StartExecResults};
use bollard::models::{ContainerStateStatusEnum, HealthStatusEnum};
use bollard::query_parameters::{InspectContainerOptions, InspectNetworkOptions};
use futures::StreamExt;
use std::collections::HashMap;

/// Socket timeout in seconds. certbot runs through exec and can take a while.
const CLIENT_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// Error Mapping Helpers
// =============================================================================

/// HTTP status and message of an API error response.
fn api_status(e: &BollardError) -> Option<(u16, &str)> {
    match e {
        BollardError::DockerResponseServerError {
            status_code,
            message,
        } => Some((*status_code, message.as_str())),
        _ => None,
    }
}

fn container_error(e: BollardError) -> ContainerError {
    match api_status(&e) {
        Some((404, message)) => ContainerError::NotFound(message.to_string()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn exec_error(e: BollardError) -> ExecError {
    match api_status(&e) {
        Some((404, message)) => ExecError::ContainerNotFound(message.to_string()),
        Some((409, message)) => ExecError::ContainerNotRunning(message.to_string()),
        _ => ExecError::Runtime(e.to_string()),
    }
}

fn connection_error(e: BollardError) -> RuntimeInfoError {
    RuntimeInfoError::ConnectionFailed(e.to_string())
}

fn container_state(status: ContainerStateStatusEnum) -> ContainerState {
    match status {
        ContainerStateStatusEnum::CREATED => ContainerState::Created,
        ContainerStateStatusEnum::RUNNING => ContainerState::Running,
        ContainerStateStatusEnum::PAUSED => ContainerState::Paused,
        ContainerStateStatusEnum::RESTARTING => ContainerState::Restarting,
        _ => ContainerState::Exited,
    }
}

fn health_state(status: HealthStatusEnum) -> Option<HealthState> {
    match status {
        HealthStatusEnum::STARTING => Some(HealthState::Starting),
        HealthStatusEnum::HEALTHY => Some(HealthState::Healthy),
        HealthStatusEnum::UNHEALTHY => Some(HealthState::Unhealthy),
        HealthStatusEnum::NONE => Some(HealthState::None),
        // Older engines leave the status empty.
        _ => None,
    }
}

fn non_empty(labels: &HashMap<String, String>) -> Option<HashMap<String, String>> {
    (!labels.is_empty()).then(|| labels.clone())
}

// =============================================================================
// BollardRuntime
// =============================================================================

/// Runtime client speaking the Docker-compatible API over a unix socket.
pub struct BollardRuntime {
    client: Docker,
    runtime_type: RuntimeType,
}

impl BollardRuntime {
    pub fn new(client: Docker, runtime_type: RuntimeType) -> Self {
        Self {
            client,
            runtime_type,
        }
    }

    /// Connect to the socket found by `detect_local()`.
    pub fn connect(endpoint: &RuntimeEndpoint) -> Result<Self, RuntimeInfoError> {
        let client = Docker::connect_with_unix(
            &endpoint.socket_path,
            CLIENT_TIMEOUT_SECS,
            bollard::API_DEFAULT_VERSION,
        )
        .map_err(connection_error)?;
        Ok(Self::new(client, endpoint.runtime_type))
    }

    /// Drain an attached exec stream into stdout and stderr buffers.
    async fn collect_output(&self, exec_id: &str) -> Result<(Vec<u8>, Vec<u8>), ExecError> {
        let started = self
            .client
            .start_exec(
                exec_id,
                Some(StartExecOptions {
                    detach: false,
                    ..Default::default()
                }),
            )
            .await
            .map_err(exec_error)?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        if let StartExecResults::Attached { mut output, .. } = started {
            while let Some(chunk) = output.next().await {
                match chunk.map_err(|e| ExecError::Failed(e.to_string()))? {
                    LogOutput::StdOut { message } => stdout.extend(message),
                    LogOutput::StdErr { message } => stderr.extend(message),
                    _ => {}
                }
            }
        }
        Ok((stdout, stderr))
    }
}

#[async_trait]
impl RuntimeInfo for BollardRuntime {
    async fn info(&self) -> Result<RuntimeMetadata, RuntimeInfoError> {
        let info = self.client.info().await.map_err(connection_error)?;
        let name = match self.runtime_type {
            RuntimeType::Docker => "Docker",
            RuntimeType::Podman => "Podman",
        };
        Ok(RuntimeMetadata {
            name: name.to_string(),
            version: info.server_version.unwrap_or_default(),
            os: info.operating_system.unwrap_or_default(),
            arch: info.architecture.unwrap_or_default(),
        })
    }

    async fn ping(&self) -> Result<(), RuntimeInfoError> {
        self.client.ping().await.map_err(connection_error)?;
        Ok(())
    }
}

#[async_trait]
impl ContainerOps for BollardRuntime {
    async fn inspect_container(
        &self,
        name: &ContainerName,
    ) -> Result<ContainerInfo, ContainerError> {
        let details = self
            .client
            .inspect_container(name.as_str(), None::<InspectContainerOptions>)
            .await
            .map_err(container_error)?;

        let state = details.state.as_ref();
        Ok(ContainerInfo {
            name: name.clone(),
            state: state
                .and_then(|s| s.status)
                .map(container_state)
                .unwrap_or(ContainerState::Exited),
            health: state
                .and_then(|s| s.health.as_ref())
                .and_then(|h| h.status)
                .and_then(health_state),
        })
    }
}

#[async_trait]
impl NetworkOps for BollardRuntime {
    async fn create_network(&self, config: &NetworkConfig) -> Result<NetworkId, NetworkError> {
        let request = bollard::models::NetworkCreateRequest {
            name: config.name.clone(),
            driver: Some("bridge".to_string()),
            labels: non_empty(&config.labels),
            ..Default::default()
        };

        match self.client.create_network(request).await {
            Ok(created) => Ok(NetworkId::new(created.id)),
            Err(e) => match api_status(&e) {
                Some((409, _)) => Err(NetworkError::AlreadyExists(config.name.clone())),
                _ => Err(NetworkError::Runtime(e.to_string())),
            },
        }
    }

    async fn network_exists(&self, name: &str) -> Result<bool, NetworkError> {
        match self
            .client
            .inspect_network(name, None::<InspectNetworkOptions>)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if matches!(api_status(&e), Some((404, _))) => Ok(false),
            Err(e) => Err(NetworkError::Runtime(e.to_string())),
        }
    }
}

#[async_trait]
impl VolumeOps for BollardRuntime {
    async fn create_volume(&self, config: &VolumeConfig) -> Result<VolumeId, VolumeError> {
        let request = bollard::models::VolumeCreateRequest {
            name: Some(config.name.clone()),
            labels: non_empty(&config.labels),
            ..Default::default()
        };

        match self.client.create_volume(request).await {
            Ok(volume) => Ok(VolumeId::new(volume.name)),
            Err(e) => match api_status(&e) {
                Some((409, _)) => Err(VolumeError::AlreadyExists(config.name.clone())),
                _ => Err(VolumeError::Runtime(e.to_string())),
            },
        }
    }

    async fn volume_exists(&self, name: &str) -> Result<bool, VolumeError> {
        match self.client.inspect_volume(name).await {
            Ok(_) => Ok(true),
            Err(e) if matches!(api_status(&e), Some((404, _))) => Ok(false),
            Err(e) => Err(VolumeError::Runtime(e.to_string())),
        }
    }
}

#[async_trait]
impl ExecOps for BollardRuntime {
    async fn exec(
        &self,
        container: &ContainerName,
        config: &ExecConfig,
    ) -> Result<ExecResult, ExecError> {
        tracing::debug!(container = %container, cmd = ?config.cmd, "exec");
        let created = self
            .client
            .create_exec(
                container.as_str(),
                bollard::models::ExecConfig {
                    cmd: Some(config.cmd.clone()),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    ..Default::default()
                },
            )
            .await
            .map_err(exec_error)?;

        let (stdout, stderr) = self.collect_output(&created.id).await?;

        // The exit code is only known once the stream has closed.
        let details = self
            .client
            .inspect_exec(&created.id)
            .await
            .map_err(exec_error)?;

        Ok(ExecResult {
            exit_code: details.exit_code.unwrap_or(0),
            stdout,
            stderr,
        })
    }
}
