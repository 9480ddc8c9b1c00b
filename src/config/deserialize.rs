// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Enforces a non-empty, uniquely named service group list.

use nonempty::NonEmpty;
use serde::Deserialize;
use std::collections::HashSet;

use super::GroupConfig;

pub fn deserialize_groups<'de, D>(deserializer: D) -> Result<NonEmpty<GroupConfig>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let groups: Vec<GroupConfig> = Vec::deserialize(deserializer)?;

    let mut seen = HashSet::new();
    for group in &groups {
        if !seen.insert(group.name.clone()) {
            return Err(serde::de::Error::custom(format!(
                "duplicate service group: {}",
                group.name
            )));
        }
        if group.services.is_empty() {
            return Err(serde::de::Error::custom(format!(
                "service group {} declares no services",
                group.name
            )));
        }
    }

    NonEmpty::from_vec(groups)
        .ok_or_else(|| serde::de::Error::custom("at least one service group is required"))
}
