// ABOUTME: Service group declarations and the built-in chat stack ordering.
// ABOUTME: database -> identity -> messaging -> proxy.

use nonempty::NonEmpty;
use serde::Deserialize;

use crate::types::{ContainerName, GroupName};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupConfig {
    pub name: GroupName,
    /// Compose services started and stopped with the group.
    pub services: Vec<String>,
    /// Containers whose health is reported for the group.
    #[serde(default)]
    pub containers: Vec<ContainerName>,
}

impl GroupConfig {
    fn builtin(name: &'static str, services: &[&str], containers: &[&'static str]) -> Self {
        Self {
            name: GroupName::from_static(name),
            services: services.iter().map(|s| s.to_string()).collect(),
            containers: containers
                .iter()
                .copied()
                .map(ContainerName::from_static)
                .collect(),
        }
    }
}

/// Dependency order of the chat stack.
pub(super) fn default_groups() -> NonEmpty<GroupConfig> {
    let mut groups = NonEmpty::new(GroupConfig::builtin("database", &["db"], &["chat-db"]));
    groups.push(GroupConfig::builtin("identity", &["idp"], &["chat-idp"]));
    groups.push(GroupConfig::builtin("messaging", &["xmpp"], &["chat-server"]));
    groups.push(GroupConfig::builtin(
        "proxy",
        &["proxy", "certbot"],
        &["chat-proxy"],
    ));
    groups
}
