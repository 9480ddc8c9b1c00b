// ABOUTME: Host-side command execution for bootstrap, setup tooling and dependency probes.
// ABOUTME: Commands run as child processes with captured output; a missing binary is reported as such.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// A command to run on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCommand {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
    pub env: HashMap<String, String>,
}

impl HostCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            env: HashMap::new(),
        }
    }

    /// Build from an argv list. Returns `None` for an empty list.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone()).args(args.iter().cloned()))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HostCommandError {
    #[error("missing dependency: {0}")]
    MissingTool(String),

    #[error("`{command}` exited with {}: {detail}", code.map_or("signal".to_string(), |c| c.to_string()))]
    Failed {
        command: String,
        code: Option<i32>,
        detail: String,
    },

    #[error("failed to run `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Runs host commands.
#[async_trait]
pub trait HostRunner: Send + Sync {
    /// Run to completion and capture output. A non-zero exit is not an error here.
    async fn output(&self, command: &HostCommand) -> Result<CommandOutput, HostCommandError>;

    /// Run to completion, failing on a non-zero exit.
    async fn run(&self, command: &HostCommand) -> Result<CommandOutput, HostCommandError> {
        let output = self.output(command).await?;
        if output.success() {
            return Ok(output);
        }
        let stderr = output.stderr.trim();
        let detail = if stderr.is_empty() {
            output.stdout.trim().to_string()
        } else {
            stderr.to_string()
        };
        Err(HostCommandError::Failed {
            command: command.to_string(),
            code: output.exit_code,
            detail,
        })
    }

    /// Whether `program` can be spawned at all. Probed with `probe_args`
    /// (e.g. `--version`); the exit status is irrelevant.
    async fn tool_available(&self, program: &str, probe_args: &[&str]) -> bool {
        let probe = HostCommand::new(program).args(probe_args.iter().copied());
        !matches!(
            self.output(&probe).await,
            Err(HostCommandError::MissingTool(_))
        )
    }
}

/// Runs commands as child processes of this one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl HostRunner for ProcessRunner {
    async fn output(&self, command: &HostCommand) -> Result<CommandOutput, HostCommandError> {
        tracing::debug!(command = %command, "running host command");

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(&command.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &command.current_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => HostCommandError::MissingTool(command.program.clone()),
            _ => HostCommandError::Io {
                command: command.to_string(),
                source: e,
            },
        })?;

        let result = CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success() {
            tracing::debug!(command = %command, code = ?result.exit_code, "host command failed");
        }

        Ok(result)
    }
}
