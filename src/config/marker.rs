// ABOUTME: Persisted record of the last selected deployment mode.
// ABOUTME: Written by `deploy` as .stackward-mode and read back by `service status`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{DeployMode, Domain};

pub const MARKER_FILENAME: &str = ".stackward-mode";

/// Which mode and domain the project was last deployed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModeMarker {
    pub mode: DeployMode,
    pub domain: Domain,
    /// When the mode was selected.
    pub selected_at: DateTime<Utc>,
    /// Hostname of the machine that ran the deploy.
    pub host: String,
}

impl ModeMarker {
    pub fn new(mode: DeployMode, domain: Domain) -> Self {
        Self {
            mode,
            domain,
            selected_at: Utc::now(),
            host: gethostname::gethostname().to_string_lossy().into_owned(),
        }
    }

    pub fn path(project_dir: &Path) -> PathBuf {
        project_dir.join(MARKER_FILENAME)
    }

    pub fn write(&self, project_dir: &Path) -> Result<()> {
        let path = Self::path(project_dir);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).map_err(|source| Error::WriteFile { path, source })
    }

    /// Read the marker, or `None` when no deploy has run yet.
    pub fn read(project_dir: &Path) -> Result<Option<Self>> {
        let path = Self::path(project_dir);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::ReadFile { path, source }),
        }
    }
}
