// ABOUTME: Composable capability traits for container runtimes.
// ABOUTME: Defines ContainerOps, ExecOps, NetworkOps, VolumeOps, GroupOps, RuntimeInfo.

mod container;
mod exec;
mod groups;
mod network;
mod runtime_info;
mod shared_types;
mod volume;

pub use container::{ContainerError, ContainerOps};
pub use exec::{ExecError, ExecOps};
pub use groups::{GroupError, GroupOps};
pub use network::{NetworkError, NetworkOps};
pub use runtime_info::{RuntimeInfo, RuntimeInfoError};
pub use shared_types::*;
pub use volume::{VolumeError, VolumeOps};
