// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands, their arguments and the global output flags.

use clap::{Parser, Subcommand};
use stackward::output::OutputMode;
use stackward::types::{DeployMode, Domain};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stackward")]
#[command(about = "Deploy and keep healthy the chat stack and its TLS certificates")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print final results
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Project directory (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up, start, bootstrap and certify the stack
    Deploy {
        /// Deployment mode
        #[arg(value_enum)]
        mode: DeployMode,

        /// Public domain (required for prod, defaults to localhost for dev)
        domain: Option<String>,

        /// Do not clone or update the message server community modules
        #[arg(long)]
        skip_modules: bool,
    },

    /// Control service groups
    Service {
        #[command(subcommand)]
        action: ServiceCommand,
    },

    /// Manage TLS certificates
    Certificates {
        #[command(subcommand)]
        action: CertificateCommand,
    },
}

#[derive(Subcommand)]
pub enum ServiceCommand {
    /// Start every group in order
    Up,
    /// Stop every group in reverse order
    Down,
    /// Stop then start one group
    Restart {
        /// Group name, e.g. `messaging`
        name: String,
    },
    /// Show the deployed mode and per-group health
    Status,
}

#[derive(Subcommand)]
pub enum CertificateCommand {
    /// Request a certificate if needed and sync it to the message server
    Init { domain: Domain },
    /// Copy issued material into the message server's certificate volume
    Sync { domain: Domain },
    /// Renew through the CA client and re-sync when new material was issued
    Renew { domain: Domain },
}
