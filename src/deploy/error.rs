// ABOUTME: Stage-tagged error types for the deploy pipeline.
// ABOUTME: Each error carries an ErrorKind for programmatic handling and an optional operator hint.

use serde::Serialize;
use std::time::Duration;

use crate::certificates::CertificateError;
use crate::health::HealthSnapshot;
use crate::host::HostCommandError;
use crate::readiness::ReadinessError;
use crate::retry::RetryError;
use crate::runtime::{GroupError, RuntimeInfoError};
use crate::sequencer::SequencerError;
use crate::types::Domain;

/// Error kinds for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Usage,
    DependencyMissing,
    ReadinessTimeout,
    BootstrapExhausted,
    CertificateAuthority,
    Sync,
    Setup,
    Runtime,
    Cancelled,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Usage => "usage",
            ErrorKind::DependencyMissing => "dependency-missing",
            ErrorKind::ReadinessTimeout => "readiness-timeout",
            ErrorKind::BootstrapExhausted => "bootstrap-exhausted",
            ErrorKind::CertificateAuthority => "certificate-authority",
            ErrorKind::Sync => "sync",
            ErrorKind::Setup => "setup",
            ErrorKind::Runtime => "runtime",
            ErrorKind::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("{0}")]
    Usage(String),

    #[error("missing dependency: {tool}")]
    DependencyMissing { tool: String },

    #[error("containers not healthy after {timeout:?}: {snapshot}")]
    ReadinessTimeout {
        timeout: Duration,
        snapshot: HealthSnapshot,
    },

    #[error("bootstrap failed after {attempts} attempts: {last}")]
    BootstrapExhausted { attempts: u32, last: String },

    #[error("certificate authority rejected {domain}: {detail}")]
    CertificateAuthority { domain: Domain, detail: String },

    #[error("{0}")]
    Sync(String),

    #[error("{0}")]
    Setup(String),

    #[error("{0}")]
    Runtime(String),

    #[error("cancelled")]
    Cancelled,
}

impl StageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StageError::Usage(_) => ErrorKind::Usage,
            StageError::DependencyMissing { .. } => ErrorKind::DependencyMissing,
            StageError::ReadinessTimeout { .. } => ErrorKind::ReadinessTimeout,
            StageError::BootstrapExhausted { .. } => ErrorKind::BootstrapExhausted,
            StageError::CertificateAuthority { .. } => ErrorKind::CertificateAuthority,
            StageError::Sync(_) => ErrorKind::Sync,
            StageError::Setup(_) => ErrorKind::Setup,
            StageError::Runtime(_) => ErrorKind::Runtime,
            StageError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// What the operator can do about it.
    pub fn hint(&self) -> Option<String> {
        match self {
            StageError::DependencyMissing { tool } => {
                Some(format!("install `{}` and make sure it is on PATH", tool))
            }
            StageError::ReadinessTimeout { snapshot, .. } => {
                let names: Vec<&str> = snapshot
                    .not_healthy()
                    .into_iter()
                    .map(|(name, _)| name.as_str())
                    .collect();
                Some(format!(
                    "inspect the container logs of: {}",
                    names.join(", ")
                ))
            }
            StageError::BootstrapExhausted { .. } => Some(
                "the identity provider may still be importing its realm; re-run the deploy once it is up"
                    .to_string(),
            ),
            StageError::CertificateAuthority { domain, .. } => Some(format!(
                "DNS for {d}, sso.{d} and xmpp.{d} must resolve to this host and ports 80/443 must be reachable. \
                 The stack stays reachable without new certificates; retry with `stackward certificates init {d}`",
                d = domain
            )),
            _ => None,
        }
    }

    pub fn from_host(e: HostCommandError) -> Self {
        match e {
            HostCommandError::MissingTool(tool) => StageError::DependencyMissing { tool },
            other => StageError::Setup(other.to_string()),
        }
    }
}

impl From<crate::error::Error> for StageError {
    fn from(e: crate::error::Error) -> Self {
        StageError::Setup(e.to_string())
    }
}

impl From<RuntimeInfoError> for StageError {
    fn from(e: RuntimeInfoError) -> Self {
        StageError::Runtime(format!("container runtime unreachable: {}", e))
    }
}

impl From<SequencerError> for StageError {
    fn from(e: SequencerError) -> Self {
        match e {
            SequencerError::Start {
                source: GroupError::MissingTool(tool),
                ..
            }
            | SequencerError::Stop {
                source: GroupError::MissingTool(tool),
                ..
            } => StageError::DependencyMissing { tool },
            SequencerError::UnknownGroup { .. } => StageError::Usage(e.to_string()),
            SequencerError::Cancelled { .. } => StageError::Cancelled,
            other => StageError::Runtime(other.to_string()),
        }
    }
}

impl From<ReadinessError> for StageError {
    fn from(e: ReadinessError) -> Self {
        match e {
            ReadinessError::Timeout {
                timeout, snapshot, ..
            } => StageError::ReadinessTimeout { timeout, snapshot },
            ReadinessError::Cancelled { .. } => StageError::Cancelled,
            ReadinessError::Runtime(e) => StageError::Runtime(e.to_string()),
            ReadinessError::Policy(e) => StageError::Setup(e.to_string()),
        }
    }
}

impl From<RetryError<HostCommandError>> for StageError {
    fn from(e: RetryError<HostCommandError>) -> Self {
        match e {
            RetryError::Exhausted { attempts, last } => StageError::BootstrapExhausted {
                attempts,
                last: last.to_string(),
            },
            RetryError::Cancelled { .. } => StageError::Cancelled,
        }
    }
}

impl From<CertificateError> for StageError {
    fn from(e: CertificateError) -> Self {
        match e {
            CertificateError::Authority { domain, detail } => {
                StageError::CertificateAuthority { domain, detail }
            }
            CertificateError::NotIssued { .. }
            | CertificateError::Coverage { .. }
            | CertificateError::Volume { .. }
            | CertificateError::Transition(_) => StageError::Sync(e.to_string()),
            CertificateError::InvalidName(_) => StageError::Usage(e.to_string()),
            CertificateError::Contact { .. } => StageError::Setup(e.to_string()),
            CertificateError::Reload { .. } | CertificateError::Store(_) => {
                StageError::Runtime(e.to_string())
            }
        }
    }
}
