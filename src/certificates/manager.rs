// ABOUTME: Certificate lifecycle orchestration across the CA client, reverse proxy and message server.
// ABOUTME: issue -> reload proxy -> sync into the shared volume -> reload message server; renew re-syncs only on new material.

use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use super::authority::{
    AuthorityError, CertbotAuthority, CertificateAuthority, IssueRequest, RenewOutcome,
};
use super::error::CertificateError;
use super::reload::{ExecReload, Reload};
use super::state::CertificateState;
use super::store::{CertbotStore, CertificateMaterial, IssuedStore};
use super::volume::SharedVolume;
use crate::config::{Config, env_file};
use crate::runtime::ExecOps;
use crate::sequencer::{CreateError, Ensurable, Ensured, ensure_exists};
use crate::types::Domain;

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub domain: Domain,
    pub certificate: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueReport {
    /// Whether a certificate was requested or already on hand.
    #[serde(serialize_with = "serialize_display")]
    pub issuance: Ensured,
    pub sync: SyncReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenewReport {
    pub renewed: bool,
    pub sync: Option<SyncReport>,
}

fn serialize_display<S: serde::Serializer>(
    value: &Ensured,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

pub struct CertificateManager {
    authority: Arc<dyn CertificateAuthority>,
    store: Arc<dyn IssuedStore>,
    proxy: Arc<dyn Reload>,
    message_server: Arc<dyn Reload>,
    volume: SharedVolume,
    subdomains: Vec<String>,
    contact: Contact,
}

/// Where the registration contact comes from.
enum Contact {
    Fixed(Option<String>),
    /// The configured address, else `LETSENCRYPT_EMAIL` read from this env file
    /// at the moment a certificate is requested.
    EnvFile {
        configured: Option<String>,
        path: PathBuf,
    },
}

impl CertificateManager {
    pub fn new(
        authority: Arc<dyn CertificateAuthority>,
        store: Arc<dyn IssuedStore>,
        proxy: Arc<dyn Reload>,
        message_server: Arc<dyn Reload>,
        volume: SharedVolume,
    ) -> Self {
        Self {
            authority,
            store,
            proxy,
            message_server,
            volume,
            subdomains: vec!["sso".to_string(), "xmpp".to_string()],
            contact: Contact::Fixed(None),
        }
    }

    /// Certbot, nginx and prosody wired through `exec` as configured.
    pub fn from_config(config: &Config, exec: Arc<dyn ExecOps>) -> Self {
        let settings = &config.certificates;
        Self::new(
            Arc::new(CertbotAuthority::new(
                exec.clone(),
                settings.certbot_container.clone(),
                settings.webroot.clone(),
            )),
            Arc::new(CertbotStore::new(
                exec.clone(),
                settings.certbot_container.clone(),
                settings.live_dir.clone(),
            )),
            Arc::new(ExecReload::new(
                exec.clone(),
                settings.proxy_container.clone(),
                settings.proxy_reload.clone(),
            )),
            Arc::new(ExecReload::new(
                exec,
                settings.message_server_container.clone(),
                settings.message_server_reload.clone(),
            )),
            SharedVolume::new(config.shared_cert_dir(), settings.owner),
        )
        .with_subdomains(settings.subdomains.clone())
        .with_contact_file(settings.email.clone(), config.stack_env_path())
    }

    pub fn with_subdomains(mut self, subdomains: Vec<String>) -> Self {
        self.subdomains = subdomains;
        self
    }

    /// Registration contact; `admin@<domain>` when unset.
    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.contact = Contact::Fixed(email);
        self
    }

    /// Use `configured` when set, otherwise look the contact up in `path` on each request.
    pub fn with_contact_file(mut self, configured: Option<String>, path: PathBuf) -> Self {
        self.contact = Contact::EnvFile { configured, path };
        self
    }

    /// The registration contact as it stands now, without the `admin@` fallback.
    pub fn configured_contact(&self) -> Result<Option<String>, CertificateError> {
        match &self.contact {
            Contact::Fixed(email) => Ok(email.clone()),
            Contact::EnvFile {
                configured: Some(email),
                ..
            } if !email.trim().is_empty() => Ok(Some(email.clone())),
            Contact::EnvFile { path, .. } => {
                let values =
                    env_file::load_env(path).map_err(|e| CertificateError::Contact {
                        path: path.clone(),
                        detail: e.to_string(),
                    })?;
                Ok(env_file::contact_email(&values))
            }
        }
    }

    fn contact_for(&self, domain: &Domain) -> Result<String, CertificateError> {
        Ok(self
            .configured_contact()?
            .unwrap_or_else(|| format!("admin@{}", domain)))
    }

    pub fn volume(&self) -> &SharedVolume {
        &self.volume
    }

    /// The primary domain followed by each declared subdomain.
    pub fn required_names(&self, domain: &Domain) -> Result<Vec<Domain>, CertificateError> {
        let mut names = vec![domain.clone()];
        for label in &self.subdomains {
            names.push(domain.subdomain(label)?);
        }
        Ok(names)
    }

    /// Obtain a certificate covering the domain and its subdomains, then sync it.
    ///
    /// Already-issued covering material skips the CA entirely.
    pub async fn issue(&self, domain: &Domain) -> Result<IssueReport, CertificateError> {
        let names = self.required_names(domain)?;
        let issued = IssuedMaterial {
            manager: self,
            domain,
            names: &names,
        };

        let issuance = ensure_exists(&issued).await?;
        match issuance {
            Ensured::Existing => {
                tracing::info!(%domain, "certificate already issued, skipping request")
            }
            Ensured::Created => self.reload(self.proxy.as_ref()).await?,
        }

        let material = self.load_covering(domain, &names).await?;
        let state = self.state_of(domain, &material)?;
        let sync = self.install(domain, state, &material).await?;
        Ok(IssueReport { issuance, sync })
    }

    /// Copy issued material into the shared volume and reload the message server.
    pub async fn sync(&self, domain: &Domain) -> Result<SyncReport, CertificateError> {
        let names = self.required_names(domain)?;
        let material = self.load_covering(domain, &names).await?;
        let state = self.state_of(domain, &material)?;
        self.install(domain, state, &material).await
    }

    /// Run the CA client's renewal; re-sync only when new material was produced.
    pub async fn renew(&self, domain: &Domain) -> Result<RenewReport, CertificateError> {
        let names = self.required_names(domain)?;
        let current = self.load_covering(domain, &names).await?;
        let state = self.state_of(domain, &current)?;

        let outcome = self
            .authority
            .renew(domain)
            .await
            .map_err(|e| authority_error(domain, e))?;

        if outcome == RenewOutcome::NotDue {
            return Ok(RenewReport {
                renewed: false,
                sync: None,
            });
        }

        let state = match state {
            CertificateState::Synced => state.transition(CertificateState::RenewalDue)?,
            other => other,
        };
        let state = state
            .transition(CertificateState::Renewing)?
            .transition(CertificateState::IssuedUnsynced)?;

        self.reload(self.proxy.as_ref()).await?;
        let renewed = self.load_covering(domain, &names).await?;
        let sync = self.install(domain, state, &renewed).await?;
        Ok(RenewReport {
            renewed: true,
            sync: Some(sync),
        })
    }

    /// Current state derived from the CA storage and the shared volume.
    pub async fn inspect(&self, domain: &Domain) -> Result<CertificateState, CertificateError> {
        let names = self.required_names(domain)?;
        match self.store.load(domain).await? {
            Some(material) if material.covers(&names) => self.state_of(domain, &material),
            _ => Ok(CertificateState::Absent),
        }
    }

    async fn load_covering(
        &self,
        domain: &Domain,
        names: &[Domain],
    ) -> Result<CertificateMaterial, CertificateError> {
        let material = self
            .store
            .load(domain)
            .await?
            .ok_or_else(|| CertificateError::NotIssued {
                domain: domain.clone(),
            })?;

        let missing = material.missing(names);
        if !missing.is_empty() {
            return Err(CertificateError::Coverage {
                domain: domain.clone(),
                missing: missing.into_iter().cloned().collect(),
            });
        }
        Ok(material)
    }

    fn state_of(
        &self,
        domain: &Domain,
        material: &CertificateMaterial,
    ) -> Result<CertificateState, CertificateError> {
        let on_volume = self
            .volume
            .read(domain)
            .map_err(|source| CertificateError::Volume {
                path: self.volume.dir().to_path_buf(),
                source,
            })?;

        let synced = on_volume.is_some_and(|(cert, key)| {
            cert == material.certificate && key == material.private_key
        });
        Ok(if synced {
            CertificateState::Synced
        } else {
            CertificateState::IssuedUnsynced
        })
    }

    async fn install(
        &self,
        domain: &Domain,
        state: CertificateState,
        material: &CertificateMaterial,
    ) -> Result<SyncReport, CertificateError> {
        state.transition(CertificateState::Synced)?;

        self.volume
            .install(domain, &material.certificate, &material.private_key)
            .map_err(|(path, source)| CertificateError::Volume { path, source })?;
        self.reload(self.message_server.as_ref()).await?;

        tracing::info!(%domain, dir = %self.volume.dir().display(), "certificate synced");
        Ok(SyncReport {
            domain: domain.clone(),
            certificate: self.volume.cert_path(domain),
            key: self.volume.key_path(domain),
        })
    }

    async fn reload(&self, target: &dyn Reload) -> Result<(), CertificateError> {
        target
            .reload()
            .await
            .map_err(|e| CertificateError::Reload {
                target: target.target().to_string(),
                detail: e.detail,
            })
    }
}

fn authority_error(domain: &Domain, e: AuthorityError) -> CertificateError {
    CertificateError::Authority {
        domain: domain.clone(),
        detail: e.to_string(),
    }
}

/// Issued material covering a domain and its subdomains, created by a CA request.
struct IssuedMaterial<'a> {
    manager: &'a CertificateManager,
    domain: &'a Domain,
    names: &'a [Domain],
}

#[async_trait]
impl Ensurable for IssuedMaterial<'_> {
    type Error = CertificateError;

    fn describe(&self) -> String {
        format!("certificate {}", self.domain)
    }

    async fn exists(&self) -> Result<bool, CertificateError> {
        Ok(self
            .manager
            .store
            .load(self.domain)
            .await?
            .is_some_and(|m| m.covers(self.names)))
    }

    async fn create(&self) -> Result<(), CreateError<CertificateError>> {
        let state = CertificateState::Absent
            .transition(CertificateState::Issuing)
            .map_err(|e| CreateError::Failed(e.into()))?;

        let request = IssueRequest {
            domain: self.domain.clone(),
            names: self.names.to_vec(),
            email: self
                .manager
                .contact_for(self.domain)
                .map_err(CreateError::Failed)?,
        };

        match self.manager.authority.request(&request).await {
            Ok(()) => {
                state
                    .transition(CertificateState::IssuedUnsynced)
                    .map_err(|e| CreateError::Failed(e.into()))?;
                Ok(())
            }
            Err(e) => {
                state
                    .transition(CertificateState::Absent)
                    .map_err(|e| CreateError::Failed(e.into()))?;
                Err(CreateError::Failed(authority_error(self.domain, e)))
            }
        }
    }
}
