// ABOUTME: Generic deploy struct parameterized by stage marker.
// ABOUTME: Carries the shared context, the request and the run record between stages.

use super::report::DeployRun;
use super::state::Configured;
use super::{DeployContext, DeployRequest};
use crate::types::{DeployMode, Domain};

/// A deploy in progress, parameterized by the last completed stage.
///
/// Stage methods consume the value, so a stage cannot run twice or out of
/// order. A failed stage yields the finished `DeployRun` instead of the next
/// state.
#[must_use = "deploy state must be used"]
pub struct Deploy<'a, S> {
    pub(crate) ctx: &'a DeployContext,
    pub(crate) request: DeployRequest,
    pub(crate) run: DeployRun,
    pub(crate) state: S,
}

impl<'a> Deploy<'a, Configured> {
    pub fn new(ctx: &'a DeployContext, request: DeployRequest) -> Self {
        let run = DeployRun::new(request.mode, request.domain.clone());
        Deploy {
            ctx,
            request,
            run,
            state: Configured,
        }
    }
}

impl<S> Deploy<'_, S> {
    pub fn mode(&self) -> DeployMode {
        self.request.mode
    }

    pub fn domain(&self) -> &Domain {
        &self.request.domain
    }

    /// Outcomes recorded so far.
    pub fn run(&self) -> &DeployRun {
        &self.run
    }

    pub fn state(&self) -> &S {
        &self.state
    }
}
