// ABOUTME: Validated DNS domain name for the deployed stack.
// ABOUTME: Derives the identity-provider and message-server hostnames from the primary domain.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("domain cannot be empty")]
    Empty,

    #[error("domain exceeds maximum length of 253 characters")]
    TooLong,

    #[error("domain contains an empty label")]
    EmptyLabel,

    #[error("domain label exceeds 63 characters: {0}")]
    LabelTooLong(String),

    #[error("domain label cannot start or end with a hyphen: {0}")]
    HyphenEdge(String),

    #[error("invalid character in domain: '{0}'")]
    InvalidChar(char),
}

/// A lowercase DNS name such as `example.com` or `localhost`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Domain(String);

impl Domain {
    pub fn new(value: &str) -> Result<Self, DomainError> {
        let normalized = value.trim().trim_end_matches('.').to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(DomainError::Empty);
        }

        if normalized.len() > MAX_DOMAIN_LEN {
            return Err(DomainError::TooLong);
        }

        for label in normalized.split('.') {
            if label.is_empty() {
                return Err(DomainError::EmptyLabel);
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(DomainError::LabelTooLong(label.to_string()));
            }
            if label.starts_with('-') || label.ends_with('-') {
                return Err(DomainError::HyphenEdge(label.to_string()));
            }
            if let Some(c) = label
                .chars()
                .find(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit() && *c != '-')
            {
                return Err(DomainError::InvalidChar(c));
            }
        }

        Ok(Self(normalized))
    }

    /// The development placeholder domain.
    pub fn localhost() -> Self {
        Self("localhost".to_string())
    }

    pub fn is_localhost(&self) -> bool {
        self.0 == "localhost"
    }

    /// Prefix this domain with a single label, e.g. `sso` → `sso.example.com`.
    pub fn subdomain(&self, label: &str) -> Result<Self, DomainError> {
        Self::new(&format!("{}.{}", label, self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Domain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for Domain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Domain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Domain::new(&s).map_err(serde::de::Error::custom)
    }
}
