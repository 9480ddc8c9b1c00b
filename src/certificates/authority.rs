// ABOUTME: Certificate authority client seam and its certbot implementation.
// ABOUTME: certbot runs in its own container and answers HTTP-01 challenges through the proxy's webroot.

use async_trait::async_trait;
use std::sync::Arc;

use crate::runtime::{ExecConfig, ExecOps};
use crate::types::{ContainerName, Domain};

/// What to ask the certificate authority for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    /// Primary name; also used as the certificate's lineage name.
    pub domain: Domain,
    /// Every name the certificate must cover, primary first.
    pub names: Vec<Domain>,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewOutcome {
    Renewed,
    NotDue,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthorityError {
    #[error("{0}")]
    Rejected(String),

    #[error("could not reach the CA client: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CertificateAuthority: Send + Sync {
    async fn request(&self, request: &IssueRequest) -> Result<(), AuthorityError>;

    async fn renew(&self, domain: &Domain) -> Result<RenewOutcome, AuthorityError>;
}

/// Drives certbot inside its container.
pub struct CertbotAuthority {
    exec: Arc<dyn ExecOps>,
    container: ContainerName,
    webroot: String,
}

impl CertbotAuthority {
    pub fn new(exec: Arc<dyn ExecOps>, container: ContainerName, webroot: impl Into<String>) -> Self {
        Self {
            exec,
            container,
            webroot: webroot.into(),
        }
    }

    pub fn request_command(&self, request: &IssueRequest) -> Vec<String> {
        let mut cmd: Vec<String> = [
            "certbot",
            "certonly",
            "--webroot",
            "-w",
            self.webroot.as_str(),
            "--cert-name",
            request.domain.as_str(),
            "--email",
            request.email.as_str(),
            "--agree-tos",
            "--no-eff-email",
            "--non-interactive",
            "--keep-until-expiring",
            "--expand",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        for name in &request.names {
            cmd.push("-d".to_string());
            cmd.push(name.to_string());
        }
        cmd
    }

    pub fn renew_command(domain: &Domain) -> Vec<String> {
        vec![
            "certbot".to_string(),
            "renew".to_string(),
            "--cert-name".to_string(),
            domain.to_string(),
            "--non-interactive".to_string(),
        ]
    }

    async fn certbot(&self, cmd: Vec<String>) -> Result<String, AuthorityError> {
        let result = self
            .exec
            .exec(&self.container, &ExecConfig::command(cmd))
            .await
            .map_err(|e| AuthorityError::Unavailable(e.to_string()))?;

        let stdout = result.stdout_lossy();
        if !result.success() {
            let stderr = result.stderr_lossy();
            let detail = last_meaningful_line(&stderr)
                .or_else(|| last_meaningful_line(&stdout))
                .unwrap_or("certbot failed without output")
                .to_string();
            return Err(AuthorityError::Rejected(detail));
        }
        Ok(format!("{}{}", stdout, result.stderr_lossy()))
    }
}

/// True when certbot's renew output says nothing was due.
pub fn renewal_not_due(output: &str) -> bool {
    output.contains("not yet due") || output.contains("No renewals were attempted")
}

fn last_meaningful_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).last()
}

#[async_trait]
impl CertificateAuthority for CertbotAuthority {
    async fn request(&self, request: &IssueRequest) -> Result<(), AuthorityError> {
        tracing::info!(domain = %request.domain, names = request.names.len(), "requesting certificate");
        self.certbot(self.request_command(request)).await?;
        Ok(())
    }

    async fn renew(&self, domain: &Domain) -> Result<RenewOutcome, AuthorityError> {
        let output = self.certbot(Self::renew_command(domain)).await?;
        if renewal_not_due(&output) {
            tracing::info!(%domain, "certificate not yet due for renewal");
            Ok(RenewOutcome::NotDue)
        } else {
            tracing::info!(%domain, "certificate renewed");
            Ok(RenewOutcome::Renewed)
        }
    }
}
