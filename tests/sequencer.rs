// ABOUTME: Integration tests for ordered service group start, stop, restart and status.
// ABOUTME: Uses the in-memory compose and runtime fakes.

mod support;

use stackward::config::Config;
use stackward::health::HealthReading;
use stackward::sequencer::{Sequencer, SequencerError};
use support::{FakeGroups, FakeRuntime, container};
use tokio_util::sync::CancellationToken;

fn sequencer() -> (std::sync::Arc<FakeRuntime>, std::sync::Arc<FakeGroups>, Sequencer) {
    let runtime = FakeRuntime::new();
    let groups = FakeGroups::new(runtime.clone());
    let sequencer = Sequencer::from_config(&Config::default(), groups.clone(), runtime.clone());
    (runtime, groups, sequencer)
}

#[tokio::test]
async fn bring_up_starts_groups_in_declared_order() {
    let (runtime, groups, sequencer) = sequencer();

    sequencer.bring_up(&CancellationToken::new()).await.unwrap();

    assert_eq!(
        groups.log(),
        [
            "start:database",
            "start:identity",
            "start:messaging",
            "start:proxy"
        ]
    );
    assert!(runtime.is_running("chat-proxy"));
}

#[tokio::test]
async fn tear_down_stops_in_exact_reverse_order() {
    let (_runtime, groups, sequencer) = sequencer();

    sequencer.tear_down().await.unwrap();

    assert_eq!(
        groups.log(),
        ["stop:proxy", "stop:messaging", "stop:identity", "stop:database"]
    );
}

#[tokio::test]
async fn tear_down_then_bring_up_twice_matches_bring_up_once() {
    let (runtime, groups, sequencer) = sequencer();
    let cancel = CancellationToken::new();

    sequencer.bring_up(&cancel).await.unwrap();
    let once = sequencer.status().await.unwrap();

    sequencer.tear_down().await.unwrap();
    sequencer.bring_up(&cancel).await.unwrap();
    sequencer.bring_up(&cancel).await.unwrap();
    let again = sequencer.status().await.unwrap();

    let healthy = |statuses: &[stackward::sequencer::GroupStatus]| {
        statuses
            .iter()
            .map(|s| (s.group.to_string(), s.healthy()))
            .collect::<Vec<_>>()
    };
    assert_eq!(healthy(&once), healthy(&again));
    assert!(again.iter().all(|s| s.healthy()));
    assert!(runtime.is_running("chat-db"));
    assert_eq!(groups.log().iter().filter(|l| l.starts_with("start:")).count(), 12);
}

#[tokio::test]
async fn restart_touches_only_the_named_group() {
    let (_runtime, groups, sequencer) = sequencer();

    sequencer.restart("messaging").await.unwrap();

    assert_eq!(groups.log(), ["stop:messaging", "start:messaging"]);
}

#[tokio::test]
async fn restart_of_unknown_group_lists_declared_groups() {
    let (_runtime, groups, sequencer) = sequencer();

    let err = sequencer.restart("cache").await.unwrap_err();

    match err {
        SequencerError::UnknownGroup { name, declared } => {
            assert_eq!(name, "cache");
            assert!(declared.contains("messaging"));
        }
        other => panic!("expected UnknownGroup, got {other:?}"),
    }
    assert!(groups.log().is_empty());
}

#[tokio::test]
async fn start_failure_names_group_and_stops_sequence() {
    let (_runtime, groups, sequencer) = sequencer();
    groups.fail_with_missing_tool("docker");

    let err = sequencer.bring_up(&CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, SequencerError::Start { ref group, .. } if group.as_str() == "database"));
    assert!(groups.log().is_empty());
}

#[tokio::test]
async fn cancelled_bring_up_starts_nothing() {
    let (runtime, groups, sequencer) = sequencer();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = sequencer.bring_up(&cancel).await.unwrap_err();

    assert!(matches!(err, SequencerError::Cancelled { .. }));
    assert!(groups.log().is_empty());
    assert!(!runtime.has_network("chat-network"));
}

#[tokio::test]
async fn status_reports_absent_containers_before_first_start() {
    let (_runtime, _groups, sequencer) = sequencer();

    let statuses = sequencer.status().await.unwrap();

    assert_eq!(statuses.len(), 4);
    assert_eq!(
        statuses[0].snapshot.get(&container("chat-db")),
        Some(HealthReading::Absent)
    );
    assert!(statuses.iter().all(|s| !s.healthy()));
}

#[tokio::test]
async fn bring_up_creates_shared_network_once() {
    let (runtime, _groups, sequencer) = sequencer();
    let cancel = CancellationToken::new();
    assert!(!runtime.has_network("chat-network"));

    sequencer.bring_up(&cancel).await.unwrap();
    sequencer.bring_up(&cancel).await.unwrap();

    assert!(runtime.has_network("chat-network"));
    assert_eq!(runtime.network_creates(), 1);
}

#[tokio::test]
async fn bring_up_creates_configured_volumes() {
    let runtime = FakeRuntime::new();
    let groups = FakeGroups::new(runtime.clone());
    let mut config = Config::default();
    config.volumes = vec!["chat-db-data".to_string()];
    let sequencer = Sequencer::from_config(&config, groups.clone(), runtime.clone());

    sequencer.bring_up(&CancellationToken::new()).await.unwrap();

    assert_eq!(runtime.volume_creates(), 1);
    assert_eq!(groups.log().len(), 4);
}

#[tokio::test]
async fn restart_does_not_touch_shared_resources() {
    let (runtime, _groups, sequencer) = sequencer();

    sequencer.restart("messaging").await.unwrap();

    assert_eq!(runtime.network_creates(), 0);
}
