// ABOUTME: Finds the local container runtime socket.
// ABOUTME: An explicit runtime in the config wins; otherwise the first existing candidate socket is used.

use super::types::{RuntimeConfig, RuntimeEndpoint, RuntimeType};
use std::os::unix::fs::MetadataExt;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("no container runtime socket found (tried {})", .tried.join(", "))]
    NoRuntimeFound { tried: Vec<String> },
}

/// Sockets probed in order: rootless Podman, rootful Podman, Docker.
fn candidates() -> Vec<RuntimeEndpoint> {
    let mut sockets = Vec::new();
    if let Ok(meta) = std::fs::metadata("/proc/self") {
        sockets.push(RuntimeEndpoint {
            runtime_type: RuntimeType::Podman,
            socket_path: format!("/run/user/{}/podman/podman.sock", meta.uid()),
        });
    }
    for runtime_type in [RuntimeType::Podman, RuntimeType::Docker] {
        sockets.push(RuntimeEndpoint {
            runtime_type,
            socket_path: runtime_type.default_socket().to_string(),
        });
    }
    sockets
}

/// Resolve the runtime endpoint for this host.
pub fn detect_local(config: &RuntimeConfig) -> Result<RuntimeEndpoint, DetectionError> {
    if let Some(runtime_type) = config.runtime {
        let socket_path = config
            .socket
            .clone()
            .unwrap_or_else(|| runtime_type.default_socket().to_string());
        return Ok(RuntimeEndpoint {
            runtime_type,
            socket_path,
        });
    }

    let candidates = candidates();
    if let Some(found) = candidates
        .iter()
        .find(|c| Path::new(&c.socket_path).exists())
    {
        tracing::debug!(runtime = %found.runtime_type, socket = %found.socket_path, "runtime detected");
        return Ok(found.clone());
    }
    Err(DetectionError::NoRuntimeFound {
        tried: candidates.into_iter().map(|c| c.socket_path).collect(),
    })
}
