// ABOUTME: Static description of one service group in the startup order.
// ABOUTME: Groups carry the compose services to start and the containers to observe.

use serde::Serialize;

use crate::types::{ContainerName, GroupName};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceGroup {
    pub name: GroupName,
    /// Zero-based place in the startup order.
    pub position: usize,
    pub services: Vec<String>,
    pub containers: Vec<ContainerName>,
}
