// End-to-end tests for `Daemon` against a wiremock daemon.
//
// Mock event-stream responses end as soon as their body is sent, so the
// link cycles Connected -> Disconnected -> (probe) -> Connected for as
// long as the mocks are mounted.
#![allow(clippy::unwrap_used)]

use std::future::Future;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use clip_core::{
    BackfillStatus, Command, ConnectionStatus, CoreError, Daemon, DaemonConfig, LogLevel,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config(server: &MockServer) -> DaemonConfig {
    let mut config = DaemonConfig::new(server.uri().parse().unwrap());
    config.timeout = Duration::from_secs(2);
    config.poll_interval = Duration::from_millis(50);
    config.reconnect_interval = Duration::from_millis(50);
    config
}

fn event_stream(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/event-stream")
}

async fn within<F: Future>(fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), fut)
        .await
        .expect("timed out waiting for daemon")
}

async fn mount_healthy(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/connection"))
        .respond_with(event_stream(": connected\n\n"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "capture_config": { "video_device_id": "screen:0", "framerate": 60 },
            "buffering": true,
            "buffer_seconds": 30,
            "ring_buffer_packets": 1800
        })))
        .mount(server)
        .await;
}

// ── Connection supervision ──────────────────────────────────────────

#[tokio::test]
async fn test_link_cycles_through_states() {
    let server = MockServer::start().await;
    mount_healthy(&server).await;

    let daemon = Daemon::new(config(&server)).unwrap();
    let mut transitions = daemon.transitions();
    daemon.connect().await;

    let mut seen = Vec::new();
    while seen.len() < 4 {
        let state = within(transitions.recv()).await.unwrap();
        seen.push(state);
    }
    daemon.disconnect().await;

    let statuses: Vec<_> = seen.iter().map(|s| s.status).collect();
    assert_eq!(
        statuses,
        vec![
            ConnectionStatus::Connecting,
            ConnectionStatus::Connected,
            ConnectionStatus::Disconnected,
            ConnectionStatus::Connected,
        ]
    );
    assert_eq!(seen[2].last_error.as_deref(), Some("Connection lost"));
    assert_eq!(seen[3].last_error, None);
}

#[tokio::test]
async fn test_recovers_once_daemon_comes_up() {
    let server = MockServer::start().await;

    let daemon = Daemon::new(config(&server)).unwrap();
    daemon.connect().await;

    let err = within(daemon.await_link(Duration::from_secs(2)))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ConnectionFailed { .. }));

    // Every probe fails against an empty mock server.
    let mut state = daemon.connection_state();
    within(state.wait_for(|s| {
        s.status == ConnectionStatus::Disconnected
            && s.last_error.as_deref() != Some("Connection lost")
    }))
    .await
    .unwrap();

    mount_healthy(&server).await;
    within(daemon.wait_until_connected(Duration::from_secs(2)))
        .await
        .unwrap();

    daemon.disconnect().await;
    assert_eq!(
        daemon.connection_snapshot().status,
        ConnectionStatus::Disconnected
    );
}

#[tokio::test]
async fn test_gated_operations_fail_while_disconnected() {
    let server = MockServer::start().await;

    let daemon = Daemon::new(config(&server)).unwrap();
    daemon.connect().await;
    let _ = within(daemon.await_link(Duration::from_secs(2))).await;

    assert!(matches!(
        daemon.status().await,
        Err(CoreError::DaemonDisconnected)
    ));
    assert!(matches!(
        daemon.execute(Command::SaveClip).await,
        Err(CoreError::DaemonDisconnected)
    ));

    daemon.disconnect().await;
}

// ── Telemetry ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_backfill_and_live_logs_merge() {
    let server = MockServer::start().await;
    mount_healthy(&server).await;

    Mock::given(method("GET"))
        .and(path("/logs/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "timestamp": "2026-01-01T00:00:00Z", "level": "info", "source": "daemon", "message": "boot" },
            { "timestamp": "2026-01-01T00:00:01Z", "level": "info", "source": "capture", "message": "pipeline ready" }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/logs"))
        .respond_with(event_stream(
            "event: log\ndata: {\"timestamp\":\"2026-01-01T00:00:02Z\",\"level\":\"warn\",\"source\":\"encoder\",\"message\":\"queue full\"}\n\n",
        ))
        .mount(&server)
        .await;

    let daemon = Daemon::new(config(&server)).unwrap();
    daemon.start_telemetry().await;

    let mut logs = daemon.logs();
    let snapshot = within(async {
        loop {
            let snap = logs.latest();
            let has_live = snap.entries.iter().any(|e| e.message == "queue full");
            let has_drop = snap.entries.iter().any(|e| e.is_system());
            if snap.backfill != BackfillStatus::Pending && has_live && has_drop {
                return snap;
            }
            logs.changed().await.unwrap();
        }
    })
    .await;
    daemon.disconnect().await;

    assert_eq!(snapshot.backfill, BackfillStatus::Loaded { count: 2 });
    assert_eq!(snapshot.entries[0].message, "boot");
    assert_eq!(snapshot.entries[1].message, "pipeline ready");

    let live = snapshot
        .entries
        .iter()
        .find(|e| e.message == "queue full")
        .unwrap();
    assert_eq!(live.level, LogLevel::Warning);

    let drop = snapshot.entries.iter().find(|e| e.is_system()).unwrap();
    assert_eq!(drop.level, LogLevel::Warning);
    assert_eq!(drop.message, "Log stream disconnected");
}

#[tokio::test]
async fn test_backfill_failure_is_reported_in_buffer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/logs/recent"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "log store offline" })),
        )
        .mount(&server)
        .await;

    let daemon = Daemon::new(config(&server)).unwrap();
    daemon.start_telemetry().await;

    let mut logs = daemon.logs();
    let snapshot = within(logs.backfill_settled()).await.unwrap();
    daemon.disconnect().await;

    assert_eq!(snapshot.backfill, BackfillStatus::Failed);
    let warning = snapshot
        .entries
        .iter()
        .find(|e| e.message.starts_with("Failed to load recent logs"))
        .unwrap();
    assert!(warning.is_system());
    assert!(warning.message.contains("log store offline"));
}
