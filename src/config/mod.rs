// ABOUTME: Configuration types and parsing for stackward.yml.
// ABOUTME: Falls back to built-in chat stack defaults and resolves env/stack.env once at load.

mod certificates;
mod deserialize;
pub mod env_file;
mod groups;
mod marker;

pub use certificates::{CertificatesConfig, FileOwner};
pub use groups::GroupConfig;
pub use marker::{MARKER_FILENAME, ModeMarker};

use crate::error::{Error, Result};
use crate::runtime::RuntimeConfig;
use crate::sequencer::ServiceGroup;
use crate::types::ContainerName;
use deserialize::deserialize_groups;
use nonempty::NonEmpty;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "stackward.yml";
pub const CONFIG_FILENAME_ALT: &str = "stackward.yaml";
pub const STACK_ENV_FILE: &str = "env/stack.env";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory all relative paths resolve against. Set by `discover`.
    #[serde(skip)]
    pub project_dir: PathBuf,

    #[serde(default = "default_compose_file")]
    pub compose_file: PathBuf,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(
        default = "groups::default_groups",
        deserialize_with = "deserialize_groups"
    )]
    pub groups: NonEmpty<GroupConfig>,

    #[serde(default)]
    pub readiness: ReadinessConfig,

    #[serde(default)]
    pub bootstrap: BootstrapConfig,

    #[serde(default)]
    pub certificates: CertificatesConfig,

    #[serde(default = "default_networks")]
    pub networks: Vec<String>,

    #[serde(default)]
    pub volumes: Vec<String>,

    #[serde(default)]
    pub setup: SetupConfig,

    /// Values from env/stack.env, resolved once when the config is discovered.
    #[serde(skip)]
    pub stack_env: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadinessConfig {
    pub containers: Vec<ContainerName>,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            containers: ["chat-db", "chat-idp", "chat-server", "chat-proxy"]
                .into_iter()
                .map(ContainerName::from_static)
                .collect(),
            timeout: Duration::from_secs(120),
            interval: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapConfig {
    /// Host command, run from the project directory.
    pub command: Vec<String>,
    pub attempts: u32,
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "python3".to_string(),
                "scripts/bootstrap-keycloak.py".to_string(),
            ],
            attempts: 5,
            delay: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SetupConfig {
    pub directories: Vec<PathBuf>,
    /// Env files under env/, each created from `<name>.example` when missing.
    pub env_files: Vec<String>,
    /// Database data directory; db.env is never generated while it holds data.
    pub database_dir: PathBuf,
    pub modules_repo: String,
    pub modules_dir: PathBuf,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            directories: [
                "env",
                "env/encrypted",
                "prosody/config",
                "prosody/certs",
                "prosody/data",
                "scripts",
                "keycloak-config/import",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
            env_files: ["stack.env", "db.env", "idp.env", "xmpp.env", "proxy.env"]
                .into_iter()
                .map(String::from)
                .collect(),
            database_dir: PathBuf::from("postgres_data"),
            modules_repo: "https://hg.prosody.im/prosody-modules/".to_string(),
            modules_dir: PathBuf::from("prosody/modules"),
        }
    }
}

fn default_compose_file() -> PathBuf {
    PathBuf::from("docker-compose.yml")
}

fn default_networks() -> Vec<String> {
    vec!["chat-network".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            compose_file: default_compose_file(),
            runtime: RuntimeConfig::default(),
            groups: groups::default_groups(),
            readiness: ReadinessConfig::default(),
            bootstrap: BootstrapConfig::default(),
            certificates: CertificatesConfig::default(),
            networks: default_networks(),
            volumes: Vec::new(),
            setup: SetupConfig::default(),
            stack_env: HashMap::new(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load `stackward.yml` from `dir`, or the built-in defaults when none exists,
    /// then resolve env/stack.env relative to `dir`.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [dir.join(CONFIG_FILENAME), dir.join(CONFIG_FILENAME_ALT)];

        let mut config = match candidates.iter().find(|p| p.exists()) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                Self::load(path)?
            }
            None => {
                tracing::debug!(dir = %dir.display(), "no stackward.yml, using built-in defaults");
                Self::default()
            }
        };

        config.project_dir = dir.to_path_buf();
        config.reload_stack_env()?;
        Ok(config)
    }

    /// Re-read env/stack.env, e.g. after setup rewrote it.
    pub fn reload_stack_env(&mut self) -> Result<()> {
        self.stack_env = env_file::load_env(&self.stack_env_path())?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.readiness.interval.is_zero() {
            return Err(Error::InvalidConfig(
                "readiness.interval must be greater than zero".to_string(),
            ));
        }
        if self.bootstrap.attempts == 0 {
            return Err(Error::InvalidConfig(
                "bootstrap.attempts must be at least 1".to_string(),
            ));
        }
        if self.bootstrap.command.is_empty() {
            return Err(Error::InvalidConfig(
                "bootstrap.command cannot be empty".to_string(),
            ));
        }
        if self.certificates.proxy_reload.is_empty()
            || self.certificates.message_server_reload.is_empty()
        {
            return Err(Error::InvalidConfig(
                "certificate reload commands cannot be empty".to_string(),
            ));
        }

        let declared: HashSet<&ContainerName> = self
            .groups
            .iter()
            .flat_map(|g| g.containers.iter())
            .collect();
        if let Some(missing) = self
            .readiness
            .containers
            .iter()
            .find(|c| !declared.contains(c))
        {
            return Err(Error::InvalidConfig(format!(
                "readiness container {} is not declared by any service group",
                missing
            )));
        }

        Ok(())
    }

    /// Service groups in start order, with their ordinal positions.
    pub fn service_groups(&self) -> NonEmpty<ServiceGroup> {
        let mut position = 0;
        self.groups.clone().map(|g| {
            let group = ServiceGroup {
                name: g.name,
                position,
                services: g.services,
                containers: g.containers,
            };
            position += 1;
            group
        })
    }

    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.project_dir.join(relative)
    }

    pub fn compose_path(&self) -> PathBuf {
        self.path(&self.compose_file)
    }

    pub fn stack_env_path(&self) -> PathBuf {
        self.path(STACK_ENV_FILE)
    }

    pub fn shared_cert_dir(&self) -> PathBuf {
        self.path(&self.certificates.shared_dir)
    }

    /// Registration contact as of the last read of env/stack.env.
    ///
    /// Setup may create that file later; the certificate manager reads it again
    /// when it registers.
    pub fn contact_email(&self) -> Option<String> {
        self.certificates
            .email
            .clone()
            .or_else(|| env_file::contact_email(&self.stack_env))
    }
}
