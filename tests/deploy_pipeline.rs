// ABOUTME: End-to-end deploy pipeline tests over in-memory runtime, compose, host and CA fakes.
// ABOUTME: Each test runs the full stage chain and checks the recorded outcome of every stage.

mod support;

use std::sync::Arc;
use std::time::Duration;

use stackward::config::{Config, ModeMarker, env_file};
use stackward::deploy::{
    DeployContext, DeployRequest, ErrorKind, FinalStatus, Stage, StageOutcome, run_deploy,
};
use stackward::runtime::HealthState;
use stackward::types::DeployMode;
use support::{
    CertificateHarness, FakeGroups, FakeHostRunner, FakeRuntime, current_owner, domain,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

struct Stack {
    dir: TempDir,
    runtime: Arc<FakeRuntime>,
    groups: Arc<FakeGroups>,
    runner: Arc<FakeHostRunner>,
    certs: CertificateHarness,
    cancel: CancellationToken,
}

impl Stack {
    fn new() -> Self {
        support::init_tracing();
        let dir = TempDir::new().unwrap();
        let env = dir.path().join("env");
        std::fs::create_dir_all(&env).unwrap();
        for name in ["stack.env", "db.env", "idp.env", "xmpp.env", "proxy.env"] {
            std::fs::write(
                env.join(format!("{}.example", name)),
                "DOMAIN=changeme\nPOSTGRES_PASSWORD=changeme\n",
            )
            .unwrap();
        }

        let runtime = FakeRuntime::new();
        Self {
            groups: FakeGroups::new(runtime.clone()),
            runtime,
            runner: FakeHostRunner::new(),
            certs: CertificateHarness::new(),
            cancel: CancellationToken::new(),
            dir,
        }
    }

    fn config(&self) -> Config {
        let mut config = Config {
            project_dir: self.dir.path().to_path_buf(),
            ..Config::default()
        };
        config.certificates.owner = Some(current_owner(self.dir.path()));
        config
    }

    fn context(&self, config: Config) -> DeployContext {
        let manager = self
            .certs
            .manager(&config.shared_cert_dir(), config.certificates.owner)
            .with_contact_file(config.certificates.email.clone(), config.stack_env_path());
        DeployContext::new(
            config,
            self.runtime.clone(),
            self.groups.clone(),
            self.runner.clone(),
            manager,
            self.cancel.clone(),
        )
        .unwrap()
    }
}

fn production(name: &str) -> DeployRequest {
    DeployRequest::new(DeployMode::Production, Some(name), true).unwrap()
}

fn development() -> DeployRequest {
    DeployRequest::new(DeployMode::Development, None, true).unwrap()
}

fn failed_kind(outcome: &StageOutcome) -> Option<ErrorKind> {
    match outcome {
        StageOutcome::Failed { kind, .. } => Some(*kind),
        _ => None,
    }
}

#[tokio::test(start_paused = true)]
async fn development_deploy_skips_public_certificates() {
    let stack = Stack::new();
    let ctx = stack.context(stack.config());

    let run = run_deploy(&ctx, development()).await;

    assert_eq!(run.final_status(), FinalStatus::Success);
    for stage in [
        Stage::Setup,
        Stage::Validate,
        Stage::Start,
        Stage::Ready,
        Stage::Bootstrap,
    ] {
        assert_eq!(run.outcome(stage), &StageOutcome::Succeeded, "{}", stage);
    }
    assert_eq!(run.outcome(Stage::Certificates), &StageOutcome::Skipped);
    assert!(stack.certs.authority.requests().is_empty());
    assert_eq!(stack.runner.calls("openssl"), 1);

    let marker = ModeMarker::read(stack.dir.path()).unwrap().unwrap();
    assert_eq!(marker.mode, DeployMode::Development);
    assert!(marker.domain.is_localhost());
}

#[tokio::test(start_paused = true)]
async fn production_deploy_issues_and_syncs_certificate() {
    let stack = Stack::new();
    let ctx = stack.context(stack.config());

    let run = run_deploy(&ctx, production("example.com")).await;

    assert_eq!(run.final_status(), FinalStatus::Success);
    assert!(run.failed_stage().is_none());
    assert_eq!(run.readiness_polls, Some(1));
    assert_eq!(run.bootstrap_attempts, Some(1));
    assert_eq!(
        stack.groups.log(),
        ["start:database", "start:identity", "start:messaging", "start:proxy"]
    );

    let certs = stack.dir.path().join("prosody/certs");
    assert!(certs.join("example.com.crt").exists());
    assert!(certs.join("example.com.key").exists());
    assert_eq!(
        run.certificate.as_ref().unwrap().sync.certificate,
        certs.join("example.com.crt")
    );

    let stack_env = env_file::load_env(&stack.dir.path().join("env/stack.env")).unwrap();
    assert_eq!(stack_env["DOMAIN"], "example.com");
    assert_eq!(stack.runner.calls("python3"), 1);
    assert_eq!(stack.runner.calls("openssl"), 0);
}

#[tokio::test(start_paused = true)]
async fn first_deploy_registers_with_contact_from_stack_env_template() {
    let stack = Stack::new();
    std::fs::write(
        stack.dir.path().join("env/stack.env.example"),
        "DOMAIN=changeme\nLETSENCRYPT_EMAIL=ops@example.com\n",
    )
    .unwrap();
    let mut config = Config::discover(stack.dir.path()).unwrap();
    assert_eq!(config.contact_email(), None);
    config.certificates.owner = Some(current_owner(stack.dir.path()));
    let ctx = stack.context(config);

    let run = run_deploy(&ctx, production("example.com")).await;

    assert_eq!(run.final_status(), FinalStatus::Success);
    let requests = stack.certs.authority.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].email, "ops@example.com");
    assert_eq!(
        ctx.certificates().configured_contact().unwrap().as_deref(),
        Some("ops@example.com")
    );
}

#[tokio::test(start_paused = true)]
async fn missing_contact_falls_back_to_domain_admin() {
    let stack = Stack::new();
    let ctx = stack.context(stack.config());

    run_deploy(&ctx, production("example.com")).await;

    assert_eq!(stack.certs.authority.requests()[0].email, "admin@example.com");
    assert_eq!(ctx.certificates().configured_contact().unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn rejected_certificate_leaves_a_partial_deploy() {
    let stack = Stack::new();
    stack
        .certs
        .authority
        .reject_with("Timeout during connect (likely firewall problem)");
    let ctx = stack.context(stack.config());

    let run = run_deploy(&ctx, production("example.com")).await;

    assert_eq!(run.final_status(), FinalStatus::Partial);
    assert_eq!(run.outcome(Stage::Bootstrap), &StageOutcome::Succeeded);
    match run.outcome(Stage::Certificates) {
        StageOutcome::Failed { kind, hint, .. } => {
            assert_eq!(*kind, ErrorKind::CertificateAuthority);
            let hint = hint.as_deref().unwrap();
            assert!(hint.contains("sso.example.com"));
            assert!(hint.contains("stackward certificates init example.com"));
        }
        other => panic!("expected failed certificates stage, got {other:?}"),
    }
    assert!(run.certificate.is_none());
    assert!(stack.runtime.is_running("chat-proxy"));
}

#[tokio::test(start_paused = true)]
async fn unhealthy_container_times_out_readiness() {
    let stack = Stack::new();
    let mut config = stack.config();
    config.readiness.timeout = Duration::from_secs(30);
    stack
        .runtime
        .script("chat-idp", std::iter::repeat_n(HealthState::Unhealthy, 100));
    let ctx = stack.context(config);

    let run = run_deploy(&ctx, production("example.com")).await;

    assert_eq!(run.final_status(), FinalStatus::Failed);
    let failed = run.failed_stage().unwrap();
    assert_eq!(failed.stage, Stage::Ready);
    assert_eq!(failed_kind(&failed.outcome), Some(ErrorKind::ReadinessTimeout));
    assert!(failed.outcome.to_string().contains("chat-idp"));
    assert_eq!(run.outcome(Stage::Bootstrap), &StageOutcome::NotRun);
    assert_eq!(stack.runner.calls("python3"), 0);
}

#[tokio::test(start_paused = true)]
async fn failing_bootstrap_exhausts_attempts() {
    let stack = Stack::new();
    let mut config = stack.config();
    config.bootstrap.attempts = 3;
    stack.runner.exit_codes("python3", [1, 1, 1]);
    let ctx = stack.context(config);

    let run = run_deploy(&ctx, production("example.com")).await;

    let failed = run.failed_stage().unwrap();
    assert_eq!(failed.stage, Stage::Bootstrap);
    assert_eq!(
        failed_kind(&failed.outcome),
        Some(ErrorKind::BootstrapExhausted)
    );
    assert_eq!(stack.runner.calls("python3"), 3);
    assert_eq!(run.outcome(Stage::Certificates), &StageOutcome::NotRun);
    assert!(stack.certs.authority.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn missing_compose_binary_fails_validation() {
    let stack = Stack::new();
    stack.runner.missing("docker");
    let ctx = stack.context(stack.config());

    let run = run_deploy(&ctx, production("example.com")).await;

    let failed = run.failed_stage().unwrap();
    assert_eq!(failed.stage, Stage::Validate);
    assert_eq!(
        failed_kind(&failed.outcome),
        Some(ErrorKind::DependencyMissing)
    );
    assert_eq!(run.outcome(Stage::Setup), &StageOutcome::Succeeded);
    assert!(stack.groups.log().is_empty());
}

#[tokio::test(start_paused = true)]
async fn missing_openssl_fails_development_setup() {
    let stack = Stack::new();
    stack.runner.missing("openssl");
    let ctx = stack.context(stack.config());

    let run = run_deploy(&ctx, development()).await;

    let failed = run.failed_stage().unwrap();
    assert_eq!(failed.stage, Stage::Setup);
    assert_eq!(
        failed_kind(&failed.outcome),
        Some(ErrorKind::DependencyMissing)
    );
}

#[tokio::test(start_paused = true)]
async fn missing_hg_fails_setup_before_validation() {
    let stack = Stack::new();
    stack.runner.missing("hg");
    let ctx = stack.context(stack.config());
    let request = DeployRequest::new(DeployMode::Production, Some("example.com"), false).unwrap();

    let run = run_deploy(&ctx, request).await;

    let failed = run.failed_stage().unwrap();
    assert_eq!(failed.stage, Stage::Setup);
    assert_eq!(
        failed_kind(&failed.outcome),
        Some(ErrorKind::DependencyMissing)
    );
    assert!(failed.outcome.to_string().contains("hg"));
    assert_eq!(run.outcome(Stage::Validate), &StageOutcome::NotRun);
}

#[tokio::test(start_paused = true)]
async fn unreachable_runtime_fails_validation() {
    let stack = Stack::new();
    stack.runtime.set_unreachable(true);
    let ctx = stack.context(stack.config());

    let run = run_deploy(&ctx, production("example.com")).await;

    let failed = run.failed_stage().unwrap();
    assert_eq!(failed.stage, Stage::Validate);
    assert_eq!(failed_kind(&failed.outcome), Some(ErrorKind::Runtime));
}

#[tokio::test(start_paused = true)]
async fn cancelled_run_records_cancellation_and_stops() {
    let stack = Stack::new();
    stack.cancel.cancel();
    let ctx = stack.context(stack.config());

    let run = run_deploy(&ctx, production("example.com")).await;

    assert!(run.cancelled());
    assert_eq!(run.outcome(Stage::Setup), &StageOutcome::Cancelled);
    assert_eq!(run.outcome(Stage::Validate), &StageOutcome::NotRun);
    assert_eq!(run.final_status(), FinalStatus::Failed);
    assert!(!stack.dir.path().join("env/stack.env").exists());
}

#[tokio::test(start_paused = true)]
async fn repeated_deploys_reuse_networks_and_certificates() {
    let stack = Stack::new();
    let mut config = stack.config();
    config.volumes = vec!["chat-db-data".to_string()];

    let ctx = stack.context(config.clone());
    let first = run_deploy(&ctx, production("example.com")).await;
    let ctx = stack.context(config);
    let second = run_deploy(&ctx, production("example.com")).await;

    assert_eq!(first.final_status(), FinalStatus::Success);
    assert_eq!(second.final_status(), FinalStatus::Success);
    assert_eq!(stack.runtime.network_creates(), 1);
    assert_eq!(stack.runtime.volume_creates(), 1);
    assert!(stack.runtime.has_network("chat-network"));
    assert_eq!(stack.certs.authority.requests().len(), 1);
    assert_eq!(
        second.certificate.unwrap().issuance,
        stackward::sequencer::Ensured::Existing
    );
}

#[tokio::test(start_paused = true)]
async fn redeploy_to_new_domain_rewrites_env_values() {
    let stack = Stack::new();
    let ctx = stack.context(stack.config());
    run_deploy(&ctx, production("old.example.com")).await;

    let run = run_deploy(&ctx, production("chat.example.org")).await;

    assert_eq!(run.final_status(), FinalStatus::Success);
    let idp = env_file::load_env(&stack.dir.path().join("env/idp.env")).unwrap();
    assert_eq!(idp["KC_HOSTNAME"], "sso.chat.example.org");
    let marker = ModeMarker::read(stack.dir.path()).unwrap().unwrap();
    assert_eq!(marker.domain, domain("chat.example.org"));
}
