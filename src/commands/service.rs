// ABOUTME: Service group commands: up, down, restart and status.
// ABOUTME: Status reads the mode marker left by the last deploy alongside live group health.

use super::runtime_connection::connect_to_runtime;
use serde::Serialize;
use stackward::config::{Config, ModeMarker};
use stackward::diagnostics::{Diagnostics, Warning};
use stackward::error::Result;
use stackward::output::Output;
use stackward::sequencer::GroupStatus;
use tokio_util::sync::CancellationToken;

pub async fn service_up(config: Config, cancel: CancellationToken, mut output: Output) -> Result<()> {
    output.start_timer();
    let local = connect_to_runtime(&config, &output).await?;
    let sequencer = local.sequencer(&config);

    output.progress(&format!(
        "Starting {} service group(s)",
        sequencer.groups().len()
    ));
    sequencer.bring_up(&cancel).await?;
    output.success("Services started");
    Ok(())
}

pub async fn service_down(config: Config, mut output: Output) -> Result<()> {
    output.start_timer();
    let local = connect_to_runtime(&config, &output).await?;
    let sequencer = local.sequencer(&config);

    output.progress("Stopping service groups in reverse order");
    sequencer.tear_down().await?;
    output.success("Services stopped");
    Ok(())
}

pub async fn service_restart(config: Config, name: &str, mut output: Output) -> Result<()> {
    output.start_timer();
    let local = connect_to_runtime(&config, &output).await?;
    let sequencer = local.sequencer(&config);

    output.progress(&format!("Restarting {}", name));
    sequencer.restart(name).await?;
    output.success(&format!("Restarted {}", name));
    Ok(())
}

#[derive(Serialize)]
struct StatusReport<'a> {
    marker: Option<&'a ModeMarker>,
    groups: &'a [GroupStatus],
}

pub async fn service_status(config: Config, output: Output) -> Result<()> {
    let mut diag = Diagnostics::default();
    let marker = ModeMarker::read(&config.project_dir)?;

    let local = connect_to_runtime(&config, &output).await?;
    let groups = local.sequencer(&config).status().await?;

    if output.is_json() {
        output.data(
            "status",
            &StatusReport {
                marker: marker.as_ref(),
                groups: &groups,
            },
        );
        return Ok(());
    }

    match &marker {
        Some(m) => output.success(&format!(
            "Mode: {} ({}), selected {} on {}",
            m.mode,
            m.domain,
            m.selected_at.format("%Y-%m-%d %H:%M:%S UTC"),
            m.host
        )),
        None => diag.warn(Warning::marker_missing(
            "no deploy recorded for this project; run `stackward deploy` first",
        )),
    }

    for group in &groups {
        let symbol = if group.healthy() { "✓" } else { "✗" };
        output.success(&format!(
            "  {} {}. {}: {}",
            symbol,
            group.position + 1,
            group.group,
            group.snapshot
        ));
    }

    for warning in diag.warnings() {
        output.warning(&warning.message);
    }
    Ok(())
}
