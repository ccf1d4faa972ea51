// ── Connection supervisor ──
//
// Single writer of `ConnectionState`. Holds the persistent status
// channel open while it can; while disconnected, probes the daemon on a
// fixed interval and reopens the channel once a probe succeeds.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::state::LinkSignal;
use super::store::{ConnectionStore, StateWriter, mark_stopped};
use crate::link::DaemonLink;

/// Supervises the link to one daemon and publishes its health into a
/// [`ConnectionStore`].
pub struct ConnectionSupervisor<L> {
    link: Arc<L>,
    store: Arc<ConnectionStore>,
    poll_interval: Duration,
    run: Mutex<Option<Run>>,
}

struct Run {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl<L> ConnectionSupervisor<L>
where
    L: DaemonLink + Sync + 'static,
{
    pub fn new(link: Arc<L>, store: Arc<ConnectionStore>, poll_interval: Duration) -> Self {
        Self {
            link,
            store,
            poll_interval,
            run: Mutex::new(None),
        }
    }

    /// The store this supervisor writes to.
    pub fn store(&self) -> &Arc<ConnectionStore> {
        &self.store
    }

    /// Whether a supervision task is currently running.
    pub async fn is_running(&self) -> bool {
        self.run
            .lock()
            .await
            .as_ref()
            .is_some_and(|run| !run.handle.is_finished())
    }

    /// Begin supervising. Idempotent: while a run is active this is a
    /// no-op, so no second channel or timer is ever created.
    ///
    /// The state is `Connecting` by the time this returns.
    pub async fn start(&self) {
        let mut run = self.run.lock().await;
        if run.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            debug!("connection supervisor already running");
            return;
        }

        let cancel = CancellationToken::new();
        let writer = StateWriter::new(Arc::clone(&self.store), cancel.clone());
        writer.begin_connecting();

        let handle = tokio::spawn(supervise(
            Arc::clone(&self.link),
            writer,
            self.poll_interval,
        ));
        *run = Some(Run { cancel, handle });
        info!("connection supervisor started");
    }

    /// Stop supervising: release the channel, cancel the poll timer and
    /// join the task. The store's final state is `Disconnected` (last
    /// error kept) and nothing writes to it after this returns.
    pub async fn stop(&self) {
        let Some(run) = self.run.lock().await.take() else {
            return;
        };
        run.cancel.cancel();
        if let Err(e) = run.handle.await {
            warn!(error = %e, "connection supervisor task panicked");
        }
        mark_stopped(&self.store);
        info!("connection supervisor stopped");
    }
}

// ── Supervision task ─────────────────────────────────────────────────

async fn supervise<L: DaemonLink>(link: Arc<L>, writer: StateWriter, poll_interval: Duration) {
    let cancel = writer.token().clone();

    loop {
        // Channel phase: open and drain until the channel fails.
        let opened = tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            result = link.open_status_channel() => result,
        };

        match opened {
            Ok(mut channel) => {
                writer.apply(&LinkSignal::ChannelOpened);
                debug!("status channel open");
                loop {
                    let item = tokio::select! {
                        biased;
                        () = cancel.cancelled() => return,
                        item = channel.next() => item,
                    };
                    match item {
                        Some(Ok(event)) => trace!(event = event.name(), "status channel event"),
                        Some(Err(e)) => {
                            debug!(error = %e, "status channel error");
                            break;
                        }
                        None => {
                            debug!("status channel ended");
                            break;
                        }
                    }
                }
            }
            Err(e) => debug!(error = %e, "status channel failed to open"),
        }
        writer.apply(&LinkSignal::ChannelFailed);

        // Poll phase: one timer, created on entering `Disconnected` and
        // dropped on leaving it.
        if !poll_until_reachable(link.as_ref(), &writer, &cancel, poll_interval).await {
            return;
        }
    }
}

/// Probe every `poll_interval` until a probe succeeds. Returns `false`
/// if cancelled first.
async fn poll_until_reachable<L: DaemonLink>(
    link: &L,
    writer: &StateWriter,
    cancel: &CancellationToken,
    poll_interval: Duration,
) -> bool {
    let mut ticker = tokio::time::interval_at(Instant::now() + poll_interval, poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return false,
            _ = ticker.tick() => {}
        }

        let probe = tokio::select! {
            biased;
            () = cancel.cancelled() => return false,
            result = link.probe() => result,
        };

        match probe {
            Ok(()) => {
                writer.apply(&LinkSignal::ProbeSucceeded);
                info!("daemon reachable again");
                return true;
            }
            Err(e) => {
                debug!(error = %e, "liveness probe failed");
                writer.apply(&LinkSignal::ProbeFailed(Some(e.connection_message())));
            }
        }
    }
}
