// ABOUTME: Shared helper for connecting to the local container runtime.
// ABOUTME: Detects the socket, builds the bollard client and the compose driver for service groups.

use std::sync::Arc;

use stackward::config::Config;
use stackward::error::Result;
use stackward::host::{HostRunner, ProcessRunner};
use stackward::output::Output;
use stackward::runtime::{BollardRuntime, ComposeCli, RuntimeError, RuntimeInfo, detect_local};
use stackward::sequencer::Sequencer;

/// Connected runtime plus the host-side tooling that drives it.
pub struct LocalRuntime {
    pub runtime: Arc<BollardRuntime>,
    pub groups: Arc<ComposeCli>,
    pub runner: Arc<dyn HostRunner>,
    /// Binary behind the compose command, e.g. `docker`.
    pub compose_program: String,
}

impl LocalRuntime {
    pub fn sequencer(&self, config: &Config) -> Sequencer {
        Sequencer::from_config(config, self.groups.clone(), self.runtime.clone())
    }
}

/// Connect to the container runtime on this machine.
///
/// A runtime that is found but not answering is not an error here.
pub async fn connect_to_runtime(config: &Config, output: &Output) -> Result<LocalRuntime> {
    output.progress("  → Detecting runtime...");
    let endpoint = detect_local(&config.runtime).map_err(RuntimeError::from)?;

    output.progress(&format!(
        "  → Found {} at {}",
        endpoint.runtime_type, endpoint.socket_path
    ));

    let runtime = BollardRuntime::connect(&endpoint).map_err(RuntimeError::from)?;
    match runtime.info().await {
        Ok(meta) => output.progress(&format!(
            "  → Connected to {} {} ({}/{})",
            meta.name, meta.version, meta.os, meta.arch
        )),
        // Commands that need the runtime report this through their own checks.
        Err(e) => {
            let e = RuntimeError::from(e);
            if e.is_unreachable() {
                tracing::warn!(socket = %endpoint.socket_path, error = %e, "runtime is not answering");
            } else {
                tracing::debug!(error = %e, "runtime info unavailable");
            }
        }
    }

    let runner: Arc<dyn HostRunner> = Arc::new(ProcessRunner);
    let program = endpoint.runtime_type.compose_command();
    let groups = ComposeCli::new(
        runner.clone(),
        program,
        &config.project_dir,
        &config.compose_path(),
    );

    Ok(LocalRuntime {
        runtime: Arc::new(runtime),
        groups: Arc::new(groups),
        runner,
        compose_program: endpoint.runtime_type.to_string(),
    })
}
