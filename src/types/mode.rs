// ABOUTME: Deployment mode selector (development or production).
// ABOUTME: Production runs the certificate stage; development uses a local self-signed certificate.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeployMode {
    #[value(name = "dev", alias = "development")]
    Development,
    #[value(name = "prod", alias = "production")]
    Production,
}

impl DeployMode {
    pub fn is_production(&self) -> bool {
        matches!(self, DeployMode::Production)
    }
}

impl fmt::Display for DeployMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployMode::Development => write!(f, "development"),
            DeployMode::Production => write!(f, "production"),
        }
    }
}
