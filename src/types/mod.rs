// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod container_name;
mod domain;
mod group_name;
mod id;
mod mode;

pub use container_name::{ContainerName, ContainerNameError};
pub use domain::{Domain, DomainError};
pub use group_name::{GroupName, GroupNameError};
pub use id::{NetworkId, VolumeId};
pub use mode::DeployMode;
