// ABOUTME: Per-stage outcomes and the final status of one deploy run.
// ABOUTME: A failed certificate request leaves a running stack, so it reports partial rather than failed.

use serde::Serialize;

use super::error::{ErrorKind, StageError};
use crate::certificates::IssueReport;
use crate::types::{DeployMode, Domain};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Setup,
    Validate,
    Start,
    Ready,
    Bootstrap,
    Certificates,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Setup,
        Stage::Validate,
        Stage::Start,
        Stage::Ready,
        Stage::Bootstrap,
        Stage::Certificates,
    ];
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Setup => "setup",
            Stage::Validate => "validate",
            Stage::Start => "start",
            Stage::Ready => "ready",
            Stage::Bootstrap => "bootstrap",
            Stage::Certificates => "certificates",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum StageOutcome {
    NotRun,
    Succeeded,
    Skipped,
    Cancelled,
    Failed {
        kind: ErrorKind,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        hint: Option<String>,
    },
}

impl StageOutcome {
    pub fn from_error(error: &StageError) -> Self {
        match error {
            StageError::Cancelled => StageOutcome::Cancelled,
            other => StageOutcome::Failed {
                kind: other.kind(),
                message: other.to_string(),
                hint: other.hint(),
            },
        }
    }
}

impl std::fmt::Display for StageOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageOutcome::NotRun => write!(f, "not run"),
            StageOutcome::Succeeded => write!(f, "succeeded"),
            StageOutcome::Skipped => write!(f, "skipped"),
            StageOutcome::Cancelled => write!(f, "cancelled"),
            StageOutcome::Failed { kind, message, .. } => write!(f, "failed ({}): {}", kind, message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinalStatus {
    Success,
    Partial,
    Failed,
}

impl std::fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FinalStatus::Success => "success",
            FinalStatus::Partial => "partial",
            FinalStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

static NOT_RUN: StageOutcome = StageOutcome::NotRun;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRecord {
    pub stage: Stage,
    #[serde(flatten)]
    pub outcome: StageOutcome,
}

/// Record of one deploy invocation.
#[derive(Debug, Clone, Serialize)]
pub struct DeployRun {
    pub mode: DeployMode,
    pub domain: Domain,
    pub stages: Vec<StageRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness_polls: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap_attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<IssueReport>,
}

impl DeployRun {
    pub fn new(mode: DeployMode, domain: Domain) -> Self {
        Self {
            mode,
            domain,
            stages: Stage::ALL
                .iter()
                .map(|stage| StageRecord {
                    stage: *stage,
                    outcome: StageOutcome::NotRun,
                })
                .collect(),
            readiness_polls: None,
            bootstrap_attempts: None,
            certificate: None,
        }
    }

    pub fn record(&mut self, stage: Stage, outcome: StageOutcome) {
        if let Some(record) = self.stages.iter_mut().find(|r| r.stage == stage) {
            record.outcome = outcome;
        }
    }

    pub fn outcome(&self, stage: Stage) -> &StageOutcome {
        self.stages
            .iter()
            .find(|r| r.stage == stage)
            .map(|r| &r.outcome)
            .unwrap_or(&NOT_RUN)
    }

    /// The first stage that failed or was cancelled.
    pub fn failed_stage(&self) -> Option<&StageRecord> {
        self.stages.iter().find(|r| {
            matches!(
                r.outcome,
                StageOutcome::Failed { .. } | StageOutcome::Cancelled
            )
        })
    }

    pub fn cancelled(&self) -> bool {
        self.stages
            .iter()
            .any(|r| r.outcome == StageOutcome::Cancelled)
    }

    pub fn final_status(&self) -> FinalStatus {
        match self.failed_stage() {
            None => FinalStatus::Success,
            Some(StageRecord {
                stage: Stage::Certificates,
                outcome:
                    StageOutcome::Failed {
                        kind: ErrorKind::CertificateAuthority,
                        ..
                    },
            }) => FinalStatus::Partial,
            Some(_) => FinalStatus::Failed,
        }
    }
}
