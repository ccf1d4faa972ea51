// ── Shared status store ──
//
// Process-wide holder of `ConnectionState`. Everyone may read; only a
// `StateWriter` handed out to the supervisor task may write, and only
// while that writer's cancellation token is live.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::state::{ConnectionState, ConnectionStatus, LinkSignal};

const TRANSITION_CHANNEL_SIZE: usize = 64;

/// Observable link-health store.
pub struct ConnectionStore {
    state: watch::Sender<ConnectionState>,
    transitions: broadcast::Sender<ConnectionState>,
}

impl Default for ConnectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionStore {
    /// Store holding the initial `{Disconnected, None}` state.
    pub fn new() -> Self {
        let (state, _) = watch::channel(ConnectionState::default());
        let (transitions, _) = broadcast::channel(TRANSITION_CHANNEL_SIZE);
        Self { state, transitions }
    }

    /// Point-in-time copy of the current state.
    pub fn current(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    /// Subscribe to the latest state. Intermediate states may be skipped.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Subscribe to every published state, in order.
    pub fn transitions(&self) -> broadcast::Receiver<ConnectionState> {
        self.transitions.subscribe()
    }

    fn publish(&self, next: ConnectionState) -> bool {
        let changed = self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next.clone();
                true
            }
        });
        if changed {
            debug!(
                status = %next.status,
                last_error = ?next.last_error,
                "connection state changed"
            );
            let _ = self.transitions.send(next);
        }
        changed
    }
}

/// Write handle for a single supervisor run.
///
/// Every write first checks the run's token, so completions that land
/// after `stop()` cancelled it are discarded.
#[derive(Clone)]
pub(crate) struct StateWriter {
    store: Arc<ConnectionStore>,
    active: CancellationToken,
}

impl StateWriter {
    pub(crate) fn new(store: Arc<ConnectionStore>, active: CancellationToken) -> Self {
        Self { store, active }
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.active
    }

    /// Apply a signal to the current state. Returns `true` if a new
    /// state was published.
    pub(crate) fn apply(&self, signal: &LinkSignal) -> bool {
        if self.active.is_cancelled() {
            return false;
        }
        let next = self.store.current().apply(signal);
        self.store.publish(next)
    }

    pub(crate) fn begin_connecting(&self) -> bool {
        if self.active.is_cancelled() {
            return false;
        }
        let next = self.store.current().begin_connecting();
        self.store.publish(next)
    }
}

/// Final write issued by `stop()` after the run has been joined.
pub(crate) fn mark_stopped(store: &ConnectionStore) {
    let current = store.current();
    store.publish(ConnectionState {
        status: ConnectionStatus::Disconnected,
        last_error: current.last_error,
    });
}
