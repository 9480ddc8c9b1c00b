// ABOUTME: DNS-compatible service group name validation.
// ABOUTME: Group names follow RFC 1123 label rules so they can double as compose profile names.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GroupNameError {
    #[error("group name cannot be empty")]
    Empty,

    #[error("group name exceeds maximum length of 63 characters")]
    TooLong,

    #[error("group name cannot start with a hyphen")]
    StartsWithHyphen,

    #[error("group name cannot end with a hyphen")]
    EndsWithHyphen,

    #[error("group name must be lowercase")]
    NotLowercase,

    #[error("invalid character in group name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupName(String);

impl GroupName {
    pub fn new(value: &str) -> Result<Self, GroupNameError> {
        if value.is_empty() {
            return Err(GroupNameError::Empty);
        }

        if value.len() > 63 {
            return Err(GroupNameError::TooLong);
        }

        if value.starts_with('-') {
            return Err(GroupNameError::StartsWithHyphen);
        }

        if value.ends_with('-') {
            return Err(GroupNameError::EndsWithHyphen);
        }

        for c in value.chars() {
            if c.is_ascii_uppercase() {
                return Err(GroupNameError::NotLowercase);
            }
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' {
                return Err(GroupNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    /// Built-in name known to satisfy the validation rules.
    pub(crate) fn from_static(value: &'static str) -> Self {
        debug_assert!(Self::new(value).is_ok(), "invalid built-in group name {value}");
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for GroupName {
    type Err = GroupNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for GroupName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for GroupName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        GroupName::new(&s).map_err(serde::de::Error::custom)
    }
}
