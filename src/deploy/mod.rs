// ABOUTME: Deploy controller using the type state pattern.
// ABOUTME: setup -> validate -> start -> await-ready -> bootstrap -> certificates, each stage recorded in a DeployRun.

mod context;
mod deployment;
mod error;
mod preflight;
mod report;
mod setup;
mod state;
mod transitions;

pub use context::DeployContext;
pub use deployment::Deploy;
pub use error::{ErrorKind, StageError};
pub use report::{DeployRun, FinalStatus, Stage, StageOutcome, StageRecord};
pub use state::{Bootstrapped, Certified, Configured, Ready, SetUp, Started, Validated};
pub use transitions::{StageResult, run_deploy};

use crate::types::{DeployMode, Domain};

/// What the operator asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    pub mode: DeployMode,
    pub domain: Domain,
    pub skip_modules: bool,
}

impl DeployRequest {
    /// Development defaults to `localhost`; production needs a public domain.
    pub fn new(
        mode: DeployMode,
        domain: Option<&str>,
        skip_modules: bool,
    ) -> Result<Self, StageError> {
        let domain = match (mode, domain) {
            (DeployMode::Production, None) => {
                return Err(StageError::Usage(
                    "production deploys need a domain, e.g. `stackward deploy prod example.com`"
                        .to_string(),
                ));
            }
            (DeployMode::Development, None) => Domain::localhost(),
            (_, Some(raw)) => Domain::new(raw).map_err(|e| StageError::Usage(e.to_string()))?,
        };

        if mode.is_production() && domain.is_localhost() {
            return Err(StageError::Usage(
                "production deploys cannot use localhost".to_string(),
            ));
        }

        Ok(Self {
            mode,
            domain,
            skip_modules,
        })
    }
}
