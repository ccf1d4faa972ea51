// ── Telemetry ingestor ──
//
// Merges the one-shot log backfill with the live log channel into a
// bounded buffer. `IngestState` is the pure single-writer state; the
// ingest task drives it from one `select!` loop and publishes a
// snapshot after every mutation.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use clip_api::{LogEvent, LogLevel, SseEvent};
use futures_util::StreamExt;
use serde::Serialize;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::Sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::buffer::LogBuffer;
use crate::error::CoreError;
use crate::link::{DaemonLink, EventChannel};
use crate::stream::LogStream;

const UPDATE_CHANNEL_SIZE: usize = 1024;

/// Message appended once per log-channel outage.
pub const STREAM_DISCONNECTED: &str = "Log stream disconnected";

/// Fallback text when a backfill failure has no description.
pub const BACKFILL_FAILED: &str = "Failed to load recent logs";

// ── Phases ───────────────────────────────────────────────────────────

/// Phase of the live log channel.
///
/// `Disconnected` doubles as the duplicate-entry guard: the synthetic
/// disconnect entry is only appended on entering it, and only reaching
/// `Live` again re-arms it. Reconnect attempts do not leave
/// `Disconnected`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StreamPhase {
    /// First open not yet resolved.
    #[default]
    Connecting,
    Live,
    Disconnected,
}

/// Outcome of the one-shot backfill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum BackfillStatus {
    #[default]
    Pending,
    Loaded { count: usize },
    Failed,
}

// ── Published views ──────────────────────────────────────────────────

/// Immutable view of the ingestor after its latest mutation.
#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    /// Buffer contents, oldest first.
    pub entries: Arc<Vec<Arc<LogEvent>>>,
    pub phase: StreamPhase,
    pub backfill: BackfillStatus,
    /// Number of buffer mutations applied so far in this run.
    pub seq: u64,
}

/// One buffer mutation, for consumers that render incrementally.
#[derive(Debug, Clone)]
pub struct LogUpdate {
    /// Matches `TelemetrySnapshot::seq` of the snapshot that first
    /// includes this change.
    pub seq: u64,
    pub change: LogChange,
}

#[derive(Debug, Clone)]
pub enum LogChange {
    /// History inserted ahead of the live entries (before capping).
    Backfill(Vec<Arc<LogEvent>>),
    /// One entry appended at the tail.
    Appended(Arc<LogEvent>),
}

// ── Pure state ───────────────────────────────────────────────────────

/// Single-writer ingest state.
#[derive(Debug, Clone)]
pub struct IngestState {
    buffer: LogBuffer,
    phase: StreamPhase,
    backfill: BackfillStatus,
    seq: u64,
}

impl IngestState {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: LogBuffer::new(capacity),
            phase: StreamPhase::Connecting,
            backfill: BackfillStatus::Pending,
            seq: 0,
        }
    }

    pub fn buffer(&self) -> &LogBuffer {
        &self.buffer
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    pub fn backfill(&self) -> BackfillStatus {
        self.backfill
    }

    /// Prepend retained history. An empty backfill changes nothing.
    pub fn backfill_loaded(&mut self, events: Vec<LogEvent>) -> Option<LogUpdate> {
        self.backfill = BackfillStatus::Loaded {
            count: events.len(),
        };
        if events.is_empty() {
            return None;
        }
        let events: Vec<_> = events.into_iter().map(Arc::new).collect();
        self.buffer.prepend(events.iter().cloned());
        Some(self.bump(LogChange::Backfill(events)))
    }

    /// Record a failed backfill as one synthetic warning.
    pub fn backfill_failed(&mut self, error: &CoreError) -> LogUpdate {
        self.backfill = BackfillStatus::Failed;
        let reason = error.to_string();
        let message = if reason.trim().is_empty() {
            BACKFILL_FAILED.to_owned()
        } else {
            format!("{BACKFILL_FAILED}: {reason}")
        };
        self.append(LogEvent::system(LogLevel::Warning, message))
    }

    /// The live channel opened; re-arms the disconnect guard.
    pub fn channel_opened(&mut self) {
        self.phase = StreamPhase::Live;
    }

    /// Decode one channel message. Non-log events are ignored and
    /// malformed payloads are dropped; neither touches the buffer.
    pub fn message_received(&mut self, event: &SseEvent) -> Option<LogUpdate> {
        if !matches!(event.name(), "log" | "message") {
            trace!(event = event.name(), "ignoring non-log event");
            return None;
        }
        match serde_json::from_str::<LogEvent>(&event.data) {
            Ok(log) => Some(self.append(log)),
            Err(e) => {
                warn!(error = %e, payload = %event.data, "dropping malformed log message");
                None
            }
        }
    }

    /// The live channel failed to open, errored, or ended. Appends the
    /// disconnect entry only on the first failure of an episode.
    pub fn channel_failed(&mut self) -> Option<LogUpdate> {
        if self.phase == StreamPhase::Disconnected {
            return None;
        }
        self.phase = StreamPhase::Disconnected;
        Some(self.append(LogEvent::system(LogLevel::Warning, STREAM_DISCONNECTED)))
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            entries: Arc::new(self.buffer.snapshot()),
            phase: self.phase,
            backfill: self.backfill,
            seq: self.seq,
        }
    }

    fn append(&mut self, event: LogEvent) -> LogUpdate {
        let event = Arc::new(event);
        self.buffer.push(Arc::clone(&event));
        self.bump(LogChange::Appended(event))
    }

    fn bump(&mut self, change: LogChange) -> LogUpdate {
        self.seq += 1;
        LogUpdate {
            seq: self.seq,
            change,
        }
    }
}

// ── Publication ──────────────────────────────────────────────────────

struct TelemetryChannels {
    snapshot: watch::Sender<TelemetrySnapshot>,
    updates: broadcast::Sender<LogUpdate>,
}

/// Write side for a single ingest run. Inert once its token is cancelled.
struct TelemetrySink {
    channels: Arc<TelemetryChannels>,
    active: CancellationToken,
}

impl TelemetrySink {
    fn publish(&self, state: &IngestState, update: Option<LogUpdate>) {
        if self.active.is_cancelled() {
            return;
        }
        self.channels.snapshot.send_replace(state.snapshot());
        if let Some(update) = update {
            let _ = self.channels.updates.send(update);
        }
    }
}

// ── Ingestor ─────────────────────────────────────────────────────────

/// Owns the ingest task for one daemon.
pub struct TelemetryIngestor<L> {
    link: Arc<L>,
    channels: Arc<TelemetryChannels>,
    capacity: usize,
    reconnect_interval: Duration,
    run: Mutex<Option<Run>>,
}

struct Run {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl<L> TelemetryIngestor<L>
where
    L: DaemonLink + Sync + 'static,
{
    pub fn new(link: Arc<L>, capacity: usize, reconnect_interval: Duration) -> Self {
        let (snapshot, _) = watch::channel(TelemetrySnapshot::default());
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_SIZE);
        Self {
            link,
            channels: Arc::new(TelemetryChannels { snapshot, updates }),
            capacity,
            reconnect_interval,
            run: Mutex::new(None),
        }
    }

    pub async fn is_running(&self) -> bool {
        self.run
            .lock()
            .await
            .as_ref()
            .is_some_and(|run| !run.handle.is_finished())
    }

    /// Begin ingesting: issue the backfill and open the live channel
    /// concurrently. Idempotent while running. Each run starts from an
    /// empty buffer.
    pub async fn start(&self) {
        let mut run = self.run.lock().await;
        if run.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            debug!("telemetry ingestor already running");
            return;
        }

        let cancel = CancellationToken::new();
        let sink = TelemetrySink {
            channels: Arc::clone(&self.channels),
            active: cancel.clone(),
        };
        let state = IngestState::new(self.capacity);
        sink.publish(&state, None);

        let handle = tokio::spawn(ingest(
            Arc::clone(&self.link),
            state,
            sink,
            self.reconnect_interval,
        ));
        *run = Some(Run { cancel, handle });
        info!("telemetry ingestor started");
    }

    /// Release the channel and join the task. No buffer mutation is
    /// published after this returns; the last snapshot stays readable
    /// with its phase set to `Disconnected`.
    pub async fn stop(&self) {
        let Some(run) = self.run.lock().await.take() else {
            return;
        };
        run.cancel.cancel();
        if let Err(e) = run.handle.await {
            warn!(error = %e, "telemetry ingestor task panicked");
        }
        // The task is joined, so this is the only writer left.
        self.channels.snapshot.send_if_modified(|snapshot| {
            let changed = snapshot.phase != StreamPhase::Disconnected;
            snapshot.phase = StreamPhase::Disconnected;
            changed
        });
        info!("telemetry ingestor stopped");
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.channels.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TelemetrySnapshot> {
        self.channels.snapshot.subscribe()
    }

    /// Subscribe to individual buffer mutations.
    pub fn updates(&self) -> broadcast::Receiver<LogUpdate> {
        self.channels.updates.subscribe()
    }

    pub fn logs(&self) -> LogStream {
        LogStream::new(self.subscribe())
    }
}

// ── Ingest task ──────────────────────────────────────────────────────

type OpenFuture<'a> = Pin<Box<dyn Future<Output = Result<EventChannel, CoreError>> + Send + 'a>>;

/// The live channel's slot in the select loop. Only one of these exists
/// per run, so at most one channel or retry timer is ever live.
enum ChannelSlot<'a> {
    Opening(OpenFuture<'a>),
    Open(EventChannel),
    Waiting(Pin<Box<Sleep>>),
}

enum ChannelStep {
    Opened(Result<EventChannel, CoreError>),
    Message(Option<Result<SseEvent, CoreError>>),
    RetryDue,
}

impl ChannelSlot<'_> {
    fn waiting(delay: Duration) -> Self {
        Self::Waiting(Box::pin(tokio::time::sleep(delay)))
    }

    /// Cancel-safe: the in-progress open, channel, or timer stays in the
    /// slot if this future is dropped.
    async fn next_step(&mut self) -> ChannelStep {
        match self {
            Self::Opening(open) => ChannelStep::Opened(open.await),
            Self::Open(channel) => ChannelStep::Message(channel.next().await),
            Self::Waiting(sleep) => {
                sleep.await;
                ChannelStep::RetryDue
            }
        }
    }
}

async fn ingest<L: DaemonLink>(
    link: Arc<L>,
    mut state: IngestState,
    sink: TelemetrySink,
    reconnect_interval: Duration,
) {
    let cancel = sink.active.clone();
    let link = link.as_ref();

    let mut backfill = std::pin::pin!(link.recent_logs());
    let mut backfill_pending = true;
    let mut slot = ChannelSlot::Opening(Box::pin(link.open_log_channel()));

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = &mut backfill, if backfill_pending => {
                backfill_pending = false;
                let update = match result {
                    Ok(events) => {
                        debug!(count = events.len(), "log backfill loaded");
                        state.backfill_loaded(events)
                    }
                    Err(e) => {
                        warn!(error = %e, "log backfill failed");
                        Some(state.backfill_failed(&e))
                    }
                };
                sink.publish(&state, update);
            }
            step = slot.next_step() => match step {
                ChannelStep::Opened(Ok(channel)) => {
                    debug!("log channel open");
                    state.channel_opened();
                    sink.publish(&state, None);
                    slot = ChannelSlot::Open(channel);
                }
                ChannelStep::Opened(Err(e)) => {
                    debug!(error = %e, "log channel failed to open");
                    let update = state.channel_failed();
                    sink.publish(&state, update);
                    slot = ChannelSlot::waiting(reconnect_interval);
                }
                ChannelStep::Message(Some(Ok(event))) => {
                    if let Some(update) = state.message_received(&event) {
                        sink.publish(&state, Some(update));
                    }
                }
                ChannelStep::Message(Some(Err(e))) => {
                    debug!(error = %e, "log channel error");
                    let update = state.channel_failed();
                    sink.publish(&state, update);
                    slot = ChannelSlot::waiting(reconnect_interval);
                }
                ChannelStep::Message(None) => {
                    debug!("log channel ended");
                    let update = state.channel_failed();
                    sink.publish(&state, update);
                    slot = ChannelSlot::waiting(reconnect_interval);
                }
                ChannelStep::RetryDue => {
                    trace!("reopening log channel");
                    slot = ChannelSlot::Opening(Box::pin(link.open_log_channel()));
                }
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::Ordering;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::connection::{ConnectionStatus, ConnectionStore, ConnectionSupervisor};
    use crate::testing::{ScriptedLink, log, log_message, settle};

    fn ingestor(link: &Arc<ScriptedLink>, capacity: usize) -> TelemetryIngestor<ScriptedLink> {
        TelemetryIngestor::new(Arc::clone(link), capacity, Duration::from_secs(2))
    }

    fn messages(snapshot: &TelemetrySnapshot) -> Vec<String> {
        snapshot.entries.iter().map(|e| e.message.clone()).collect()
    }

    fn numbered(prefix: &str, count: usize) -> Vec<LogEvent> {
        (0..count)
            .map(|n| {
                let message = format!("{prefix} {n}");
                log("2026-01-01T00:00:00Z", LogLevel::Info, "daemon", &message)
            })
            .collect()
    }

    // ── Pure state ───────────────────────────────────────────────────

    #[test]
    fn repeated_failures_append_one_entry_per_episode() {
        let mut state = IngestState::new(100);
        state.channel_opened();
        assert!(state.channel_failed().is_some());
        assert!(state.channel_failed().is_none());
        assert!(state.channel_failed().is_none());
        assert_eq!(state.phase(), StreamPhase::Disconnected);

        state.channel_opened();
        assert_eq!(state.phase(), StreamPhase::Live);
        assert!(state.channel_failed().is_some());

        let disconnects = state
            .buffer()
            .iter()
            .filter(|e| e.message == STREAM_DISCONNECTED)
            .count();
        assert_eq!(disconnects, 2);
    }

    #[test]
    fn failed_first_open_counts_as_an_episode() {
        let mut state = IngestState::new(100);
        assert_eq!(state.phase(), StreamPhase::Connecting);
        assert!(state.channel_failed().is_some());
        assert!(state.channel_failed().is_none());
    }

    #[test]
    fn malformed_and_foreign_messages_are_dropped() {
        let mut state = IngestState::new(100);
        let garbage = SseEvent {
            event: Some("log".into()),
            data: "{not json".into(),
            id: None,
        };
        let ping = SseEvent {
            event: Some("ping".into()),
            data: "ping".into(),
            id: None,
        };
        assert!(state.message_received(&garbage).is_none());
        assert!(state.message_received(&ping).is_none());
        assert!(state.buffer().is_empty());
        assert_eq!(state.snapshot().seq, 0);
    }

    #[test]
    fn backfill_failure_appends_system_warning() {
        let mut state = IngestState::new(100);
        let update = state.backfill_failed(&CoreError::Timeout { timeout_secs: 10 });
        let LogChange::Appended(entry) = update.change else {
            panic!("expected an appended entry");
        };
        assert!(entry.is_system());
        assert_eq!(entry.level, LogLevel::Warning);
        assert!(entry.message.starts_with(BACKFILL_FAILED));
        assert_eq!(state.backfill(), BackfillStatus::Failed);
    }

    #[test]
    fn merge_equals_tail_of_backfill_then_live() {
        for (n, m) in [(0, 0), (10, 5), (1000, 0), (400, 700), (1000, 1000), (999, 3)] {
            let backfill = numbered("history", n);
            let live = numbered("live", m);

            // Live entries first, backfill landing afterwards.
            let mut late = IngestState::new(1000);
            for event in &live {
                late.message_received(&log_message(event));
            }
            late.backfill_loaded(backfill.clone());

            // Backfill first.
            let mut early = IngestState::new(1000);
            early.backfill_loaded(backfill.clone());
            for event in &live {
                early.message_received(&log_message(event));
            }

            let all: Vec<String> = backfill
                .iter()
                .chain(live.iter())
                .map(|e| e.message.clone())
                .collect();
            let expected = all[all.len().saturating_sub(1000)..].to_vec();

            assert_eq!(messages(&early.snapshot()), expected, "n={n} m={m}");
            assert_eq!(messages(&late.snapshot()), expected, "n={n} m={m}");
            assert!(late.buffer().len() <= 1000);
        }
    }

    // ── Task ─────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn boot_then_device_lost_scenario() {
        let link = Arc::new(ScriptedLink::new());
        link.backfill(Ok(vec![log("t1", LogLevel::Info, "daemon", "boot")]));
        let status_feed = link.status_channel();
        let log_feed = link.log_channel();

        let store = Arc::new(ConnectionStore::new());
        let supervisor = ConnectionSupervisor::new(
            Arc::clone(&link),
            Arc::clone(&store),
            Duration::from_secs(2),
        );
        let mut transitions = store.transitions();
        let telemetry = ingestor(&link, 1000);

        supervisor.start().await;
        telemetry.start().await;
        settle().await;

        log_feed
            .send(Ok(log_message(&log("t2", LogLevel::Error, "capture", "device lost"))))
            .unwrap();
        settle().await;
        log_feed.send(Err(CoreError::ChannelClosed)).unwrap();
        status_feed.send(Err(CoreError::ChannelClosed)).unwrap();
        settle().await;

        let snapshot = telemetry.snapshot();
        assert_eq!(
            messages(&snapshot),
            vec!["boot", "device lost", STREAM_DISCONNECTED]
        );
        let last = snapshot.entries.last().unwrap();
        assert_eq!(last.level, LogLevel::Warning);
        assert_eq!(last.source, "system");
        assert_eq!(snapshot.phase, StreamPhase::Disconnected);

        let mut statuses = Vec::new();
        while let Ok(state) = transitions.try_recv() {
            statuses.push(state.status);
        }
        assert_eq!(
            statuses,
            vec![
                ConnectionStatus::Connecting,
                ConnectionStatus::Connected,
                ConnectionStatus::Disconnected,
            ]
        );

        telemetry.stop().await;
        supervisor.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn one_disconnect_entry_across_failed_reopens() {
        let link = Arc::new(ScriptedLink::new());
        let first = link.log_channel();
        link.fail_log_open("connection refused");
        link.fail_log_open("connection refused");
        let second = link.log_channel();

        let telemetry = ingestor(&link, 1000);
        telemetry.start().await;
        settle().await;
        assert_eq!(telemetry.snapshot().phase, StreamPhase::Live);

        drop(first);
        // Two failed reopens at +2s and +4s, success at +6s.
        tokio::time::sleep(Duration::from_millis(6100)).await;
        let snapshot = telemetry.snapshot();
        assert_eq!(snapshot.phase, StreamPhase::Live);
        assert_eq!(messages(&snapshot), vec![STREAM_DISCONNECTED]);
        assert_eq!(link.log_open_calls.load(Ordering::SeqCst), 4);

        second.send(Err(CoreError::ChannelClosed)).unwrap();
        settle().await;
        assert_eq!(
            messages(&telemetry.snapshot()),
            vec![STREAM_DISCONNECTED, STREAM_DISCONNECTED]
        );
        telemetry.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn backfill_failure_does_not_block_live_stream() {
        let link = Arc::new(ScriptedLink::new());
        link.backfill(Err("daemon restarting"));
        let feed = link.log_channel();

        let telemetry = ingestor(&link, 1000);
        telemetry.start().await;
        settle().await;
        feed.send(Ok(log_message(&log("t1", LogLevel::Info, "capture", "started"))))
            .unwrap();
        settle().await;

        let snapshot = telemetry.snapshot();
        assert_eq!(snapshot.backfill, BackfillStatus::Failed);
        assert_eq!(snapshot.phase, StreamPhase::Live);
        assert_eq!(snapshot.entries.len(), 2);
        assert!(snapshot.entries[0].is_system());
        assert!(snapshot.entries[0].message.contains("daemon restarting"));
        assert_eq!(snapshot.entries[1].message, "started");
        telemetry.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn late_backfill_is_prepended_ahead_of_live_entries() {
        let link = Arc::new(ScriptedLink::new());
        let gate = link.gated_backfill();
        let feed = link.log_channel();
        let telemetry = ingestor(&link, 1000);
        let mut updates = telemetry.updates();
        telemetry.start().await;
        settle().await;
        feed.send(Ok(log_message(&log("t3", LogLevel::Info, "capture", "live"))))
            .unwrap();
        settle().await;
        gate.send(Ok(vec![
            log("t1", LogLevel::Info, "daemon", "old 1"),
            log("t2", LogLevel::Info, "daemon", "old 2"),
        ]))
        .unwrap();
        settle().await;

        assert_eq!(
            messages(&telemetry.snapshot()),
            vec!["old 1", "old 2", "live"]
        );
        assert!(matches!(updates.try_recv().unwrap().change, LogChange::Appended(_)));
        let backfill = updates.try_recv().unwrap();
        assert_eq!(backfill.seq, 2);
        assert!(matches!(backfill.change, LogChange::Backfill(ref e) if e.len() == 2));
        telemetry.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent() {
        let link = Arc::new(ScriptedLink::new());
        let _feed = link.log_channel();
        let telemetry = ingestor(&link, 1000);

        telemetry.start().await;
        telemetry.start().await;
        settle().await;
        telemetry.start().await;
        settle().await;

        assert_eq!(link.log_open_calls.load(Ordering::SeqCst), 1);
        assert_eq!(link.backfill_calls.load(Ordering::SeqCst), 1);
        assert!(telemetry.is_running().await);
        telemetry.stop().await;
        assert!(!telemetry.is_running().await);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_discards_in_flight_backfill_and_restart_is_fresh() {
        let link = Arc::new(ScriptedLink::new());
        let gate = link.gated_backfill();
        let feed = link.log_channel();
        let telemetry = ingestor(&link, 1000);

        telemetry.start().await;
        settle().await;
        feed.send(Ok(log_message(&log("t1", LogLevel::Info, "capture", "before stop"))))
            .unwrap();
        settle().await;
        telemetry.stop().await;

        let stopped = telemetry.snapshot();
        let _ = gate.send(Ok(vec![log("t0", LogLevel::Info, "daemon", "late")]));
        let _ = feed.send(Ok(log_message(&log("t2", LogLevel::Info, "capture", "after stop"))));
        settle().await;
        assert_eq!(messages(&telemetry.snapshot()), messages(&stopped));
        assert_eq!(messages(&stopped), vec!["before stop"]);
        assert_eq!(stopped.phase, StreamPhase::Disconnected);

        let _fresh = link.log_channel();
        telemetry.start().await;
        settle().await;
        let snapshot = telemetry.snapshot();
        assert!(snapshot.entries.is_empty());
        assert_eq!(snapshot.phase, StreamPhase::Live);
        assert_eq!(link.log_open_calls.load(Ordering::SeqCst), 2);
        telemetry.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_reports_released_channel_without_new_entries() {
        let link = Arc::new(ScriptedLink::new());
        let _feed = link.log_channel();
        let telemetry = ingestor(&link, 1000);
        let mut rx = telemetry.subscribe();

        telemetry.start().await;
        settle().await;
        let live = rx.borrow_and_update().clone();
        assert_eq!(live.phase, StreamPhase::Live);

        telemetry.stop().await;
        assert!(rx.has_changed().unwrap());
        let stopped = rx.borrow_and_update().clone();
        assert_eq!(stopped.phase, StreamPhase::Disconnected);
        assert_eq!(stopped.seq, live.seq);
        assert!(stopped.entries.is_empty());

        // A second stop is a no-op.
        telemetry.stop().await;
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn burst_stays_within_capacity() {
        let link = Arc::new(ScriptedLink::new());
        let feed = link.log_channel();
        let telemetry = ingestor(&link, 1000);
        let mut rx = telemetry.subscribe();

        telemetry.start().await;
        settle().await;
        for event in numbered("burst", 2500) {
            feed.send(Ok(log_message(&event))).unwrap();
        }
        settle().await;

        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.entries.len(), 1000);
        assert_eq!(snapshot.entries[0].message, "burst 1500");
        assert_eq!(snapshot.seq, 2500);
        telemetry.stop().await;
    }
}
