// ABOUTME: Application-wide error types for stackward.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::certificates::CertificateError;
use crate::deploy::{FinalStatus, Stage, StageError};
use crate::runtime::RuntimeError;
use crate::sequencer::SequencerError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Sequencer(#[from] SequencerError),

    #[error(transparent)]
    Certificate(#[from] CertificateError),

    #[error("deploy finished with status {status}: {stage} stage did not complete")]
    DeployIncomplete { status: FinalStatus, stage: Stage },

    #[error("interrupted")]
    Interrupted,
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Interrupted | Error::Stage(StageError::Cancelled) => 130,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
