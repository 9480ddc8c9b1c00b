// ABOUTME: Error types for certificate issuance, renewal and synchronization.
// ABOUTME: Separates CA rejections from local sync and reload problems.

use std::path::PathBuf;

use super::state::InvalidTransition;
use crate::runtime::ExecError;
use crate::types::{Domain, DomainError};

#[derive(Debug, thiserror::Error)]
pub enum CertificateError {
    #[error("certificate authority rejected {domain}: {detail}")]
    Authority { domain: Domain, detail: String },

    #[error("no issued certificate for {domain}; run `stackward certificates init {domain}` first")]
    NotIssued { domain: Domain },

    #[error("issued certificate for {domain} does not cover: {}", names(.missing))]
    Coverage { domain: Domain, missing: Vec<Domain> },

    #[error("failed to write {path}: {source}")]
    Volume {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to reload {target}: {detail}")]
    Reload { target: String, detail: String },

    #[error("failed to read registration contact from {path}: {detail}")]
    Contact { path: PathBuf, detail: String },

    #[error("failed to read certificate storage: {0}")]
    Store(#[from] ExecError),

    #[error("invalid certificate name: {0}")]
    InvalidName(#[from] DomainError),

    #[error(transparent)]
    Transition(#[from] InvalidTransition),
}

fn names(domains: &[Domain]) -> String {
    domains
        .iter()
        .map(Domain::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
