// ABOUTME: Which container runtime drives the stack and where its API socket lives.
// ABOUTME: Also names the compose binary used to start and stop service groups.

use serde::{Deserialize, Serialize};

/// Container runtime flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeType {
    Docker,
    Podman,
}

impl RuntimeType {
    /// Host binary for this runtime.
    pub fn program(self) -> &'static str {
        match self {
            RuntimeType::Docker => "docker",
            RuntimeType::Podman => "podman",
        }
    }

    /// `<program> compose`, the prefix for every group command.
    pub fn compose_command(self) -> Vec<String> {
        vec![self.program().to_string(), "compose".to_string()]
    }

    /// Socket used when the configuration names the runtime but no path.
    pub fn default_socket(self) -> &'static str {
        match self {
            RuntimeType::Docker => "/var/run/docker.sock",
            RuntimeType::Podman => "/run/podman/podman.sock",
        }
    }
}

impl std::fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.program())
    }
}

/// A runtime socket found on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeEndpoint {
    pub runtime_type: RuntimeType,
    pub socket_path: String,
}

/// `runtime:` section of `stackward.yml`. Both fields are optional overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeConfig {
    pub runtime: Option<RuntimeType>,
    pub socket: Option<String>,
}
