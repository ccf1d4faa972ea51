// Scripted `DaemonLink` for unit tests.
//
// Each endpoint pops its next scripted outcome; an empty script means
// the daemon is unreachable (opens and probes fail, backfill is empty).

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use clip_api::{LogEvent, LogLevel, SseEvent};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::error::CoreError;
use crate::link::{DaemonLink, EventChannel};

/// Sending half of a scripted channel. Push `Ok` events, an `Err` to
/// fail the channel, or drop it to end the channel.
pub(crate) type ChannelFeed = mpsc::UnboundedSender<Result<SseEvent, CoreError>>;

type ChannelRx = mpsc::UnboundedReceiver<Result<SseEvent, CoreError>>;

enum OpenScript {
    Open(ChannelRx),
    Fail(String),
}

enum Reply<T> {
    Ready(Result<T, String>),
    Gated(oneshot::Receiver<Result<T, CoreError>>),
}

#[derive(Default)]
pub(crate) struct ScriptedLink {
    status_opens: Mutex<VecDeque<OpenScript>>,
    log_opens: Mutex<VecDeque<OpenScript>>,
    probes: Mutex<VecDeque<Reply<()>>>,
    backfills: Mutex<VecDeque<Reply<Vec<LogEvent>>>>,
    pub status_open_calls: AtomicUsize,
    pub log_open_calls: AtomicUsize,
    pub probe_calls: AtomicUsize,
    pub backfill_calls: AtomicUsize,
}

impl ScriptedLink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn status_channel(&self) -> ChannelFeed {
        let (tx, rx) = mpsc::unbounded_channel();
        self.status_opens
            .lock()
            .unwrap()
            .push_back(OpenScript::Open(rx));
        tx
    }

    pub(crate) fn fail_status_open(&self, reason: &str) {
        self.status_opens
            .lock()
            .unwrap()
            .push_back(OpenScript::Fail(reason.to_owned()));
    }

    pub(crate) fn log_channel(&self) -> ChannelFeed {
        let (tx, rx) = mpsc::unbounded_channel();
        self.log_opens.lock().unwrap().push_back(OpenScript::Open(rx));
        tx
    }

    pub(crate) fn fail_log_open(&self, reason: &str) {
        self.log_opens
            .lock()
            .unwrap()
            .push_back(OpenScript::Fail(reason.to_owned()));
    }

    pub(crate) fn probe_result(&self, result: Result<(), &str>) {
        self.probes
            .lock()
            .unwrap()
            .push_back(Reply::Ready(result.map_err(str::to_owned)));
    }

    pub(crate) fn gated_probe(&self) -> oneshot::Sender<Result<(), CoreError>> {
        let (tx, rx) = oneshot::channel();
        self.probes.lock().unwrap().push_back(Reply::Gated(rx));
        tx
    }

    pub(crate) fn backfill(&self, result: Result<Vec<LogEvent>, &str>) {
        self.backfills
            .lock()
            .unwrap()
            .push_back(Reply::Ready(result.map_err(str::to_owned)));
    }

    pub(crate) fn gated_backfill(&self) -> oneshot::Sender<Result<Vec<LogEvent>, CoreError>> {
        let (tx, rx) = oneshot::channel();
        self.backfills.lock().unwrap().push_back(Reply::Gated(rx));
        tx
    }
}

fn refused(reason: String) -> CoreError {
    CoreError::ConnectionFailed {
        url: "http://127.0.0.1:43123".into(),
        reason,
    }
}

fn open(script: Option<OpenScript>) -> Result<EventChannel, CoreError> {
    match script {
        Some(OpenScript::Open(rx)) => Ok(Box::pin(UnboundedReceiverStream::new(rx))),
        Some(OpenScript::Fail(reason)) => Err(refused(reason)),
        None => Err(refused("connection refused".into())),
    }
}

async fn reply<T: Default>(
    script: Option<Reply<T>>,
    unscripted: Result<T, String>,
) -> Result<T, CoreError> {
    match script {
        Some(Reply::Ready(result)) => result.map_err(refused),
        Some(Reply::Gated(rx)) => rx.await.unwrap_or_else(|_| Ok(T::default())),
        None => unscripted.map_err(refused),
    }
}

impl DaemonLink for ScriptedLink {
    async fn probe(&self) -> Result<(), CoreError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.probes.lock().unwrap().pop_front();
        reply(script, Err("connection refused".into())).await
    }

    async fn open_status_channel(&self) -> Result<EventChannel, CoreError> {
        self.status_open_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.status_opens.lock().unwrap().pop_front();
        open(script)
    }

    async fn recent_logs(&self) -> Result<Vec<LogEvent>, CoreError> {
        self.backfill_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.backfills.lock().unwrap().pop_front();
        reply(script, Ok(Vec::new())).await
    }

    async fn open_log_channel(&self) -> Result<EventChannel, CoreError> {
        self.log_open_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.log_opens.lock().unwrap().pop_front();
        open(script)
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────

pub(crate) fn log(timestamp: &str, level: LogLevel, source: &str, message: &str) -> LogEvent {
    LogEvent {
        timestamp: timestamp.to_owned(),
        level,
        source: source.to_owned(),
        message: message.to_owned(),
    }
}

/// Wire form of a live log message.
pub(crate) fn log_message(event: &LogEvent) -> SseEvent {
    SseEvent {
        event: Some("log".into()),
        data: serde_json::to_string(event).unwrap(),
        id: None,
    }
}

/// Let spawned tasks run to quiescence (advances paused time by 10ms).
pub(crate) async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}
