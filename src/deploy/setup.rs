// ABOUTME: Setup stage: project directories, env files, domain values, dev certificate, server modules.
// ABOUTME: Every step is safe to repeat; the mode marker is written last.

use std::path::{Path, PathBuf};

use super::DeployRequest;
use super::error::StageError;
use crate::config::{Config, ModeMarker, env_file};
use crate::host::{HostCommand, HostRunner};

/// Env file that must never be regenerated over an initialised database.
const DATABASE_ENV: &str = "db.env";

pub async fn run_setup(
    config: &Config,
    runner: &dyn HostRunner,
    request: &DeployRequest,
) -> Result<(), StageError> {
    ensure_directories(config)?;
    ensure_env_files(config)?;
    write_domain(config, request)?;

    if !request.mode.is_production() && request.domain.is_localhost() {
        ensure_localhost_certificate(config, runner).await?;
    }

    if request.skip_modules {
        tracing::info!("skipping message server module update");
    } else {
        update_modules(config, runner).await?;
    }

    ModeMarker::new(request.mode, request.domain.clone()).write(&config.project_dir)?;
    tracing::info!(mode = %request.mode, domain = %request.domain, "setup complete");
    Ok(())
}

fn ensure_directories(config: &Config) -> Result<(), StageError> {
    for dir in &config.setup.directories {
        let path = config.path(dir);
        std::fs::create_dir_all(&path)
            .map_err(|e| StageError::Setup(format!("cannot create {}: {}", path.display(), e)))?;
    }
    Ok(())
}

fn env_path(config: &Config, name: &str) -> PathBuf {
    config.path("env").join(name)
}

fn ensure_env_files(config: &Config) -> Result<(), StageError> {
    for name in &config.setup.env_files {
        let target = env_path(config, name);
        if target.exists() {
            continue;
        }

        if name == DATABASE_ENV && dir_has_entries(&config.path(&config.setup.database_dir)) {
            return Err(StageError::Setup(format!(
                "{} is missing but {} already holds data; restore the original credentials instead of generating new ones",
                target.display(),
                config.setup.database_dir.display()
            )));
        }

        let template = env_path(config, &format!("{}.example", name));
        if !template.exists() {
            return Err(StageError::Setup(format!(
                "{} is missing and there is no template at {}",
                target.display(),
                template.display()
            )));
        }

        std::fs::copy(&template, &target).map_err(|e| {
            StageError::Setup(format!("cannot create {}: {}", target.display(), e))
        })?;
        tracing::info!(file = %target.display(), "created env file from template");
    }
    Ok(())
}

fn dir_has_entries(dir: &Path) -> bool {
    std::fs::read_dir(dir).is_ok_and(|mut entries| entries.next().is_some())
}

fn write_domain(config: &Config, request: &DeployRequest) -> Result<(), StageError> {
    let domain = request.domain.as_str();
    let admin = format!("admin@{}", domain);
    let sso = format!("sso.{}", domain);

    let assignments: [(&str, &str, &str); 5] = [
        ("stack.env", "DOMAIN", domain),
        ("xmpp.env", "DOMAIN", domain),
        ("xmpp.env", "PROSODY_ADMIN_JID", &admin),
        ("proxy.env", "DOMAIN", domain),
        ("idp.env", "KC_HOSTNAME", &sso),
    ];

    for (file, key, value) in assignments {
        if !config.setup.env_files.iter().any(|f| f == file) {
            continue;
        }
        env_file::set_env_value(&env_path(config, file), key, value)?;
        tracing::debug!(file, key, value, "env value written");
    }
    Ok(())
}

async fn ensure_localhost_certificate(
    config: &Config,
    runner: &dyn HostRunner,
) -> Result<(), StageError> {
    let dir = config.shared_cert_dir();
    let cert = dir.join("localhost.crt");
    let key = dir.join("localhost.key");
    if cert.exists() && key.exists() {
        tracing::debug!("localhost certificate already present");
        return Ok(());
    }

    let command = HostCommand::new("openssl").args([
        "req".to_string(),
        "-x509".to_string(),
        "-newkey".to_string(),
        "rsa:2048".to_string(),
        "-nodes".to_string(),
        "-keyout".to_string(),
        key.display().to_string(),
        "-out".to_string(),
        cert.display().to_string(),
        "-days".to_string(),
        "365".to_string(),
        "-subj".to_string(),
        "/CN=localhost".to_string(),
    ]);
    runner.run(&command).await.map_err(StageError::from_host)?;
    tracing::info!(dir = %dir.display(), "generated self-signed localhost certificate");
    Ok(())
}

async fn update_modules(config: &Config, runner: &dyn HostRunner) -> Result<(), StageError> {
    let dir = config.path(&config.setup.modules_dir);
    let command = if dir.join(".hg").exists() {
        tracing::info!(dir = %dir.display(), "updating message server modules");
        HostCommand::new("hg").args([
            "-R".to_string(),
            dir.display().to_string(),
            "pull".to_string(),
            "-u".to_string(),
        ])
    } else {
        tracing::info!(repo = %config.setup.modules_repo, "cloning message server modules");
        HostCommand::new("hg").args([
            "clone".to_string(),
            config.setup.modules_repo.clone(),
            dir.display().to_string(),
        ])
    };
    runner
        .run(&command.current_dir(&config.project_dir))
        .await
        .map_err(StageError::from_host)?;
    Ok(())
}
