// ABOUTME: Container runtime access for Docker and Podman.
// ABOUTME: Auto-detects the local runtime socket and exposes capability traits over it.

mod bollard;
mod compose;
mod detection;
mod error;
mod traits;
mod types;

pub use bollard::BollardRuntime;
pub use compose::ComposeCli;
pub use detection::{DetectionError, detect_local};
pub use error::RuntimeError;
pub use traits::*;
pub use types::{RuntimeConfig, RuntimeEndpoint, RuntimeType};
