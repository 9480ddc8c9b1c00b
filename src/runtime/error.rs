// ABOUTME: Errors raised while locating and connecting to the container runtime.
// ABOUTME: Reported before any deploy stage runs.

use snafu::Snafu;

use super::detection::DetectionError;
use super::traits::RuntimeInfoError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RuntimeError {
    #[snafu(display("runtime detection failed: {source}"))]
    Detection { source: DetectionError },

    #[snafu(display("runtime connection failed: {source}"))]
    Connection { source: RuntimeInfoError },
}

impl RuntimeError {
    /// Whether a runtime was found but did not answer.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            RuntimeError::Connection {
                source: RuntimeInfoError::ConnectionFailed(_)
            }
        )
    }
}

impl From<DetectionError> for RuntimeError {
    fn from(source: DetectionError) -> Self {
        RuntimeError::Detection { source }
    }
}

impl From<RuntimeInfoError> for RuntimeError {
    fn from(source: RuntimeInfoError) -> Self {
        RuntimeError::Connection { source }
    }
}
