// ABOUTME: Values passed across the runtime capability traits.
// ABOUTME: Container state and health, network and volume specs, exec commands and their output.

use crate::types::ContainerName;
use std::collections::HashMap;

/// State and health of a container as reported by the runtime.
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    pub name: ContainerName,
    pub state: ContainerState,
    /// `None` when the image declares no healthcheck.
    pub health: Option<HealthState>,
}

/// Lifecycle state. Removing and dead containers report as `Exited`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Exited,
}

/// Healthcheck verdict of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Starting,
    Healthy,
    Unhealthy,
    /// The runtime reports that no healthcheck is configured.
    None,
}

/// A shared network the stack's compose file declares as external.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub name: String,
    pub labels: HashMap<String, String>,
}

/// A named volume the stack's compose file declares as external.
#[derive(Debug, Clone)]
pub struct VolumeConfig {
    pub name: String,
    pub labels: HashMap<String, String>,
}

/// What the connected runtime reports about itself.
#[derive(Debug, Clone)]
pub struct RuntimeMetadata {
    /// "Docker" or "Podman".
    pub name: String,
    pub version: String,
    pub os: String,
    pub arch: String,
}

/// A command run inside a container with stdout and stderr captured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecConfig {
    pub cmd: Vec<String>,
}

impl ExecConfig {
    pub fn command<I, S>(cmd: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cmd: cmd.into_iter().map(Into::into).collect(),
        }
    }
}

/// Captured output of an exec.
#[derive(Debug, Clone)]
pub struct ExecResult {
    pub exit_code: i64,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ExecResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}
