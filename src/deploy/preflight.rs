// ABOUTME: Validate stage: compose binary present, runtime reachable, env domain agreement.
// ABOUTME: Runs after setup so the env files it checks are already in place.

use super::error::StageError;
use super::{DeployContext, DeployRequest};
use crate::config::env_file;

/// Compose binary, runtime reachability and env domain agreement.
///
/// Setup reports a missing `openssl` or `hg` itself when it first runs them.
pub async fn validate(ctx: &DeployContext, request: &DeployRequest) -> Result<(), StageError> {
    let tool = &ctx.compose_program;
    if !ctx.runner.tool_available(tool, &["--version"]).await {
        return Err(StageError::DependencyMissing { tool: tool.clone() });
    }
    tracing::debug!(%tool, "tool present");

    ctx.runtime.ping().await?;

    let stack_env = env_file::load_env(&ctx.config.stack_env_path())?;
    match stack_env.get("DOMAIN").map(|d| d.trim()) {
        Some(domain) if domain == request.domain.as_str() => {}
        Some(domain) => {
            return Err(StageError::Setup(format!(
                "DOMAIN in {} is {} but this run deploys {}",
                ctx.config.stack_env_path().display(),
                domain,
                request.domain
            )));
        }
        None => {
            return Err(StageError::Setup(format!(
                "DOMAIN is not set in {}",
                ctx.config.stack_env_path().display()
            )));
        }
    }

    tracing::info!(domain = %request.domain, "preflight checks passed");
    Ok(())
}
