// ── Daemon abstraction ──
//
// Explicitly owned handle for one local capture daemon. Owns the API
// client, the connection supervisor, the telemetry ingestor and the
// command processor; consumers observe everything through `watch` and
// `broadcast` subscriptions.

use std::sync::Arc;
use std::time::Duration;

use clip_api::{
    AudioDevice, ClipInfo, DaemonClient, StatusResponse, TransportConfig, UserSettings,
    VideoDevice, VideoEncoder,
};
use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::config::DaemonConfig;
use crate::connection::{ConnectionState, ConnectionStatus, ConnectionStore, ConnectionSupervisor};
use crate::error::CoreError;
use crate::stream::LogStream;
use crate::telemetry::{LogUpdate, TelemetryIngestor, TelemetrySnapshot};

const COMMAND_CHANNEL_SIZE: usize = 64;

// ── Daemon ───────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<DaemonInner>`. Daemon-dependent queries
/// and commands are gated on `ConnectionStatus::Connected` and fail
/// with [`CoreError::DaemonDisconnected`] otherwise.
#[derive(Clone)]
pub struct Daemon {
    inner: Arc<DaemonInner>,
}

struct DaemonInner {
    config: DaemonConfig,
    client: Arc<DaemonClient>,
    store: Arc<ConnectionStore>,
    supervisor: ConnectionSupervisor<DaemonClient>,
    telemetry: TelemetryIngestor<DaemonClient>,
    commands: Mutex<Option<CommandProcessor>>,
}

struct CommandProcessor {
    tx: mpsc::Sender<CommandEnvelope>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Daemon {
    /// Create a handle from configuration. Does NOT connect; call
    /// [`connect()`](Self::connect) to start supervising the link.
    pub fn new(config: DaemonConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
            ..TransportConfig::default()
        };
        let client = Arc::new(DaemonClient::new(config.url.clone(), &transport)?);
        let store = Arc::new(ConnectionStore::new());
        let supervisor = ConnectionSupervisor::new(
            Arc::clone(&client),
            Arc::clone(&store),
            config.poll_interval,
        );
        let telemetry = TelemetryIngestor::new(
            Arc::clone(&client),
            config.log_capacity,
            config.reconnect_interval,
        );

        Ok(Self {
            inner: Arc::new(DaemonInner {
                config,
                client,
                store,
                supervisor,
                telemetry,
                commands: Mutex::new(None),
            }),
        })
    }

    /// Access the daemon configuration.
    pub fn config(&self) -> &DaemonConfig {
        &self.inner.config
    }

    /// Access the shared connection store.
    pub fn store(&self) -> &Arc<ConnectionStore> {
        &self.inner.store
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Start supervising the link and processing commands. Idempotent.
    pub async fn connect(&self) {
        self.inner.supervisor.start().await;

        let mut commands = self.inner.commands.lock().await;
        if commands.as_ref().is_some_and(|p| !p.handle.is_finished()) {
            return;
        }
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(command_processor_task(
            Arc::clone(&self.inner.client),
            rx,
            cancel.clone(),
        ));
        *commands = Some(CommandProcessor { tx, cancel, handle });
        debug!(url = %self.inner.config.url, "daemon handle connected");
    }

    /// Start the telemetry ingestor (backfill + live logs). Idempotent.
    pub async fn start_telemetry(&self) {
        self.inner.telemetry.start().await;
    }

    pub async fn stop_telemetry(&self) {
        self.inner.telemetry.stop().await;
    }

    /// Stop every background task. Nothing is published after this returns.
    pub async fn disconnect(&self) {
        self.inner.telemetry.stop().await;

        if let Some(processor) = self.inner.commands.lock().await.take() {
            processor.cancel.cancel();
            drop(processor.tx);
            if let Err(e) = processor.handle.await {
                warn!(error = %e, "command processor panicked");
            }
        }

        self.inner.supervisor.stop().await;
        info!("disconnected from daemon");
    }

    /// Wait for the first outcome of the link (channel open or failure).
    ///
    /// Returns `Ok` once `Connected`; returns the recorded failure as
    /// [`CoreError::ConnectionFailed`] once `Disconnected`.
    pub async fn await_link(&self, timeout: Duration) -> Result<(), CoreError> {
        let mut rx = self.inner.store.subscribe();
        let settled = tokio::time::timeout(
            timeout,
            rx.wait_for(|s| s.status != ConnectionStatus::Connecting),
        )
        .await;

        match settled {
            Ok(Ok(state)) if state.is_connected() => Ok(()),
            Ok(Ok(state)) => Err(self.connection_failed(state.last_error.clone())),
            Ok(Err(_)) => Err(CoreError::Internal("connection store closed".into())),
            Err(_) => Err(CoreError::Timeout {
                timeout_secs: timeout.as_secs(),
            }),
        }
    }

    /// Wait until the link is `Connected`, however long polling takes.
    pub async fn wait_until_connected(&self, timeout: Duration) -> Result<(), CoreError> {
        let mut rx = self.inner.store.subscribe();
        match tokio::time::timeout(timeout, rx.wait_for(ConnectionState::is_connected)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) => Err(CoreError::Internal("connection store closed".into())),
            Err(_) => Err(self.connection_failed(self.inner.store.current().last_error)),
        }
    }

    fn connection_failed(&self, reason: Option<String>) -> CoreError {
        CoreError::ConnectionFailed {
            url: self.inner.config.url.to_string(),
            reason: reason.unwrap_or_else(|| crate::error::CONNECTION_LOST.to_owned()),
        }
    }

    // ── State observation ────────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.store.subscribe()
    }

    pub fn connection_snapshot(&self) -> ConnectionState {
        self.inner.store.current()
    }

    /// Subscribe to every connection state transition, in order.
    pub fn transitions(&self) -> broadcast::Receiver<ConnectionState> {
        self.inner.store.transitions()
    }

    pub fn logs(&self) -> LogStream {
        self.inner.telemetry.logs()
    }

    pub fn logs_snapshot(&self) -> TelemetrySnapshot {
        self.inner.telemetry.snapshot()
    }

    /// Subscribe to individual log buffer mutations.
    pub fn log_updates(&self) -> broadcast::Receiver<LogUpdate> {
        self.inner.telemetry.updates()
    }

    // ── Gated queries ────────────────────────────────────────────────

    fn gated(&self) -> Result<&DaemonClient, CoreError> {
        if self.inner.store.current().is_connected() {
            Ok(&self.inner.client)
        } else {
            Err(CoreError::DaemonDisconnected)
        }
    }

    pub async fn status(&self) -> Result<StatusResponse, CoreError> {
        Ok(self.gated()?.status().await?)
    }

    pub async fn video_devices(&self) -> Result<Vec<VideoDevice>, CoreError> {
        Ok(self.gated()?.video_devices().await?)
    }

    pub async fn audio_devices(&self) -> Result<Vec<AudioDevice>, CoreError> {
        Ok(self.gated()?.audio_devices().await?)
    }

    pub async fn microphone_devices(&self) -> Result<Vec<AudioDevice>, CoreError> {
        Ok(self.gated()?.microphone_devices().await?)
    }

    pub async fn video_encoders(&self) -> Result<Vec<VideoEncoder>, CoreError> {
        Ok(self.gated()?.video_encoders().await?)
    }

    pub async fn settings(&self) -> Result<UserSettings, CoreError> {
        Ok(self.gated()?.get_settings().await?)
    }

    pub async fn clips(&self) -> Result<Vec<ClipInfo>, CoreError> {
        Ok(self.gated()?.list_clips().await?)
    }

    // ── Command execution ────────────────────────────────────────────

    /// Execute a command against the daemon.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if !self.inner.store.current().is_connected() {
            return Err(CoreError::DaemonDisconnected);
        }

        let tx = self
            .inner
            .commands
            .lock()
            .await
            .as_ref()
            .map(|p| p.tx.clone())
            .ok_or(CoreError::DaemonDisconnected)?;

        let (response_tx, response_rx) = tokio::sync::oneshot::channel();
        tx.send(CommandEnvelope {
            command: cmd,
            response_tx,
        })
        .await
        .map_err(|_| CoreError::DaemonDisconnected)?;

        response_rx
            .await
            .map_err(|_| CoreError::DaemonDisconnected)?
    }

    // ── One-shot convenience ─────────────────────────────────────────

    /// One-shot: connect, wait for the link, run closure, disconnect.
    pub async fn oneshot<F, Fut, T>(config: DaemonConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Daemon) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let timeout = config.timeout;
        let daemon = Daemon::new(config)?;
        daemon.connect().await;
        if let Err(e) = daemon.await_link(timeout).await {
            daemon.disconnect().await;
            return Err(e);
        }
        let result = f(daemon.clone()).await;
        daemon.disconnect().await;
        result
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Process commands from the mpsc channel one at a time.
async fn command_processor_task(
    client: Arc<DaemonClient>,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                debug!(command = envelope.command.name(), "executing command");
                let result = route_command(&client, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────────

async fn route_command(client: &DaemonClient, cmd: Command) -> Result<CommandResult, CoreError> {
    match cmd {
        Command::UpdateSettings(settings) => {
            let stored = client.update_settings(&settings).await?;
            Ok(CommandResult::Settings(stored))
        }
        Command::SetCapture(config) => {
            client.set_capture(&config).await?;
            Ok(CommandResult::Ok)
        }
        Command::SaveClip => Ok(CommandResult::Clip(client.save_clip().await?)),
        Command::Shutdown => {
            let resp = client.shutdown().await?;
            Ok(CommandResult::ShuttingDown(resp.shutting_down))
        }
    }
}
