// ABOUTME: Deploy pipeline state marker types for the type state pattern.
// ABOUTME: Each marker only exposes the stage method that may run next.

use crate::certificates::IssueReport;
use crate::health::HealthSnapshot;

/// Request accepted, nothing touched yet.
/// Available actions: `setup()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Configured;

/// Project directories, env files and mode marker in place.
/// Available actions: `validate()`
#[derive(Debug, Clone, Copy, Default)]
pub struct SetUp;

/// Tools present, runtime reachable, env domain matches.
/// Available actions: `start()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Validated;

/// Every service group started in order.
/// Available actions: `await_ready()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Started;

/// Readiness gate passed.
/// Available actions: `bootstrap()`
#[derive(Debug, Clone)]
pub struct Ready {
    pub snapshot: HealthSnapshot,
    pub polls: u32,
}

/// Identity provider bootstrapped.
/// Available actions: `certificates()`
#[derive(Debug, Clone, Copy)]
pub struct Bootstrapped {
    pub attempts: u32,
}

/// Certificates issued and synced, or skipped in development.
/// Available actions: `finish()`
#[derive(Debug, Clone, Default)]
pub struct Certified {
    pub issued: Option<IssueReport>,
}
