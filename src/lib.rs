// ABOUTME: Library root for stackward - exposes the deploy engine for the binary and tests.
// ABOUTME: The main binary is in main.rs.

pub mod bootstrap;
pub mod certificates;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod health;
pub mod host;
pub mod output;
pub mod readiness;
pub mod retry;
pub mod runtime;
pub mod sequencer;
pub mod types;
