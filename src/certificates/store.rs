// ABOUTME: Access to certificate material held by the CA client.
// ABOUTME: Reads the live fullchain/private key and the names the certificate covers.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::runtime::{ExecConfig, ExecError, ExecOps};
use crate::types::{ContainerName, Domain};

/// Issued certificate chain, private key and covered names.
#[derive(Clone, PartialEq, Eq)]
pub struct CertificateMaterial {
    pub certificate: Vec<u8>,
    pub private_key: Vec<u8>,
    pub names: BTreeSet<Domain>,
}

impl CertificateMaterial {
    /// Names in `required` this certificate does not cover.
    pub fn missing<'a>(&self, required: &'a [Domain]) -> Vec<&'a Domain> {
        required.iter().filter(|d| !self.names.contains(*d)).collect()
    }

    pub fn covers(&self, required: &[Domain]) -> bool {
        self.missing(required).is_empty()
    }
}

impl std::fmt::Debug for CertificateMaterial {
    // Never print key bytes.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateMaterial")
            .field("certificate_len", &self.certificate.len())
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait IssuedStore: Send + Sync {
    /// Material issued for `domain`, or `None` if the CA client holds none.
    async fn load(&self, domain: &Domain) -> Result<Option<CertificateMaterial>, ExecError>;
}

/// Reads certbot's live directory inside the certbot container.
pub struct CertbotStore {
    exec: Arc<dyn ExecOps>,
    container: ContainerName,
    live_dir: String,
}

impl CertbotStore {
    pub fn new(exec: Arc<dyn ExecOps>, container: ContainerName, live_dir: impl Into<String>) -> Self {
        Self {
            exec,
            container,
            live_dir: live_dir.into(),
        }
    }

    fn live_path(&self, domain: &Domain, file: &str) -> String {
        format!("{}/{}/{}", self.live_dir.trim_end_matches('/'), domain, file)
    }

    async fn covered_names(&self, domain: &Domain) -> Result<Option<BTreeSet<Domain>>, ExecError> {
        let result = self
            .exec
            .exec(
                &self.container,
                &ExecConfig::command([
                    "certbot",
                    "certificates",
                    "--cert-name",
                    domain.as_str(),
                ]),
            )
            .await?;
        if !result.success() {
            return Err(ExecError::Failed(result.stderr_lossy().trim().to_string()));
        }
        Ok(parse_domains_line(&result.stdout_lossy()))
    }
}

/// Extract the names from certbot's `Domains:` line.
pub fn parse_domains_line(output: &str) -> Option<BTreeSet<Domain>> {
    let line = output
        .lines()
        .map(str::trim)
        .find_map(|l| l.strip_prefix("Domains:"))?;
    let names: BTreeSet<Domain> = line
        .split_whitespace()
        .filter_map(|n| Domain::new(n).ok())
        .collect();
    if names.is_empty() { None } else { Some(names) }
}

#[async_trait]
impl IssuedStore for CertbotStore {
    async fn load(&self, domain: &Domain) -> Result<Option<CertificateMaterial>, ExecError> {
        let Some(names) = self.covered_names(domain).await? else {
            return Ok(None);
        };

        let certificate = self
            .exec
            .read_file(&self.container, &self.live_path(domain, "fullchain.pem"))
            .await?;
        let private_key = self
            .exec
            .read_file(&self.container, &self.live_path(domain, "privkey.pem"))
            .await?;

        match (certificate, private_key) {
            (Some(certificate), Some(private_key)) => Ok(Some(CertificateMaterial {
                certificate,
                private_key,
                names,
            })),
            _ => {
                tracing::warn!(%domain, "certbot lists the certificate but live files are missing");
                Ok(None)
            }
        }
    }
}
