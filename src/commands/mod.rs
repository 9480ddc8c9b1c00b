// ABOUTME: Command module aggregator for the stackward CLI.
// ABOUTME: Re-exports deploy, service, and certificate command handlers.

mod certificates;
mod deploy;
mod runtime_connection;
mod service;

pub use certificates::{certificates_init, certificates_renew, certificates_sync};
pub use deploy::deploy;
pub use service::{service_down, service_restart, service_status, service_up};
