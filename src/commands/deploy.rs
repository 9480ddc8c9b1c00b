// ABOUTME: Deploy command implementation.
// ABOUTME: Connects to the local runtime, runs the stage pipeline and reports every stage outcome.

use super::runtime_connection::connect_to_runtime;
use serde::Serialize;
use stackward::certificates::CertificateManager;
use stackward::config::Config;
use stackward::deploy::{
    DeployContext, DeployRequest, DeployRun, FinalStatus, StageOutcome, run_deploy,
};
use stackward::diagnostics::{Diagnostics, Warning};
use stackward::error::{Error, Result};
use stackward::output::Output;
use stackward::sequencer::Ensured;
use tokio_util::sync::CancellationToken;

#[derive(Serialize)]
struct RunSummary<'a> {
    #[serde(flatten)]
    run: &'a DeployRun,
    status: FinalStatus,
}

/// Deploy the stack in the requested mode.
pub async fn deploy(
    config: Config,
    request: DeployRequest,
    cancel: CancellationToken,
    mut output: Output,
) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();

    output.progress(&format!(
        "Deploying {} ({})",
        request.domain, request.mode
    ));

    if !request.mode.is_production() {
        diag.warn(Warning::self_signed(
            "development mode uses a self-signed localhost certificate",
        ));
    }

    let local = connect_to_runtime(&config, &output).await?;
    let certificates = CertificateManager::from_config(&config, local.runtime.clone());
    let ctx = DeployContext::new(
        config,
        local.runtime,
        local.groups,
        local.runner,
        certificates,
        cancel,
    )?
    .with_compose_program(local.compose_program);

    let domain = request.domain.clone();
    let run = run_deploy(&ctx, request).await;
    report(&run, &output);

    // Setup may have created env/stack.env, so the contact is checked after the run.
    if run.certificate.as_ref().is_some_and(|c| c.issuance == Ensured::Created)
        && matches!(ctx.certificates().configured_contact(), Ok(None))
    {
        diag.warn(Warning::contact_fallback(format!(
            "no LETSENCRYPT_EMAIL in env/stack.env; registered with admin@{}",
            domain
        )));
    }

    if output.is_json() {
        if diag.has_warnings() {
            output.data("warnings", &diag.warnings());
        }
    } else {
        for warning in diag.warnings() {
            output.warning(&warning.message);
        }
    }

    let status = run.final_status();
    if status == FinalStatus::Success {
        output.success("Deployment complete!");
        return Ok(());
    }
    if run.cancelled() {
        return Err(Error::Interrupted);
    }
    match run.failed_stage() {
        Some(record) => Err(Error::DeployIncomplete {
            status,
            stage: record.stage,
        }),
        None => Ok(()),
    }
}

fn report(run: &DeployRun, output: &Output) {
    if output.is_json() {
        output.data(
            "deploy",
            &RunSummary {
                run,
                status: run.final_status(),
            },
        );
        return;
    }

    for record in &run.stages {
        let symbol = match record.outcome {
            StageOutcome::Succeeded => "✓",
            StageOutcome::Skipped | StageOutcome::NotRun => "-",
            StageOutcome::Cancelled | StageOutcome::Failed { .. } => "✗",
        };
        output.progress(&format!("  {} {}: {}", symbol, record.stage, record.outcome));
        if let StageOutcome::Failed {
            hint: Some(hint), ..
        } = &record.outcome
        {
            output.warning(hint);
        }
    }

    if let Some(polls) = run.readiness_polls {
        output.progress(&format!("  → Stack healthy after {} poll(s)", polls));
    }
    if let Some(attempts) = run.bootstrap_attempts {
        output.progress(&format!("  → Bootstrap succeeded on attempt {}", attempts));
    }
    if let Some(issued) = &run.certificate {
        output.progress(&format!(
            "  → Certificate {} ({}), synced to {}",
            issued.sync.domain,
            issued.issuance,
            issued.sync.certificate.display()
        ));
    }
}
