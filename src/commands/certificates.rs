// ABOUTME: Certificate commands: init, sync and renew for one domain.
// ABOUTME: Each command drives the certificate manager over the runtime's exec channel.

use super::runtime_connection::connect_to_runtime;
use stackward::certificates::CertificateManager;
use stackward::config::Config;
use stackward::error::Result;
use stackward::output::Output;
use stackward::types::Domain;

async fn manager(config: &Config, output: &Output) -> Result<CertificateManager> {
    let local = connect_to_runtime(config, output).await?;
    Ok(CertificateManager::from_config(config, local.runtime))
}

pub async fn certificates_init(config: Config, domain: Domain, mut output: Output) -> Result<()> {
    output.start_timer();
    let manager = manager(&config, &output).await?;

    output.progress(&format!("  → Requesting certificate for {}...", domain));
    let report = manager.issue(&domain).await?;

    output.data("certificates-init", &report);
    output.success(&format!(
        "Certificate {} ({}), synced to {}",
        domain,
        report.issuance,
        report.sync.certificate.display()
    ));
    Ok(())
}

pub async fn certificates_sync(config: Config, domain: Domain, mut output: Output) -> Result<()> {
    output.start_timer();
    let manager = manager(&config, &output).await?;

    output.progress(&format!("  → Syncing certificate for {}...", domain));
    let report = manager.sync(&domain).await?;

    output.data("certificates-sync", &report);
    output.success(&format!(
        "Synced {} and {}",
        report.certificate.display(),
        report.key.display()
    ));
    Ok(())
}

pub async fn certificates_renew(config: Config, domain: Domain, mut output: Output) -> Result<()> {
    output.start_timer();
    let manager = manager(&config, &output).await?;

    output.progress(&format!("  → Renewing certificate for {}...", domain));
    let report = manager.renew(&domain).await?;

    output.data("certificates-renew", &report);
    match &report.sync {
        Some(sync) => output.success(&format!(
            "Renewed {}, synced to {}",
            domain,
            sync.certificate.display()
        )),
        None => output.success(&format!("Certificate for {} is not due for renewal", domain)),
    }
    Ok(())
}
