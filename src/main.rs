// ABOUTME: Entry point for the stackward CLI application.
// ABOUTME: Parses arguments, wires Ctrl-C to cancellation and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{CertificateCommand, Cli, Commands, ServiceCommand};
use stackward::config::Config;
use stackward::deploy::DeployRequest;
use stackward::error::Result;
use stackward::output::Output;
use std::env;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            interrupt.cancel();
        }
    });

    let mode = cli.output_mode();
    if let Err(e) = run(cli, cancel).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli, cancel: CancellationToken) -> Result<()> {
    let output = Output::new(cli.output_mode());
    let project_dir = match cli.project_dir {
        Some(dir) => dir,
        None => env::current_dir()?,
    };

    match cli.command {
        Commands::Deploy {
            mode,
            domain,
            skip_modules,
        } => {
            let request = DeployRequest::new(mode, domain.as_deref(), skip_modules)?;
            let config = Config::discover(&project_dir)?;
            commands::deploy(config, request, cancel, output).await
        }
        Commands::Service { action } => {
            let config = Config::discover(&project_dir)?;
            match action {
                ServiceCommand::Up => commands::service_up(config, cancel, output).await,
                ServiceCommand::Down => commands::service_down(config, output).await,
                ServiceCommand::Restart { name } => {
                    commands::service_restart(config, &name, output).await
                }
                ServiceCommand::Status => commands::service_status(config, output).await,
            }
        }
        Commands::Certificates { action } => {
            let config = Config::discover(&project_dir)?;
            match action {
                CertificateCommand::Init { domain } => {
                    commands::certificates_init(config, domain, output).await
                }
                CertificateCommand::Sync { domain } => {
                    commands::certificates_sync(config, domain, output).await
                }
                CertificateCommand::Renew { domain } => {
                    commands::certificates_renew(config, domain, output).await
                }
            }
        }
    }
}
