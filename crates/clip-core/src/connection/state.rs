// ── Connection state machine ──
//
// Pure transition function for link health. The supervisor task feeds
// it signals; tests fold arbitrary signal sequences through it.

use serde::Serialize;

use crate::error::CONNECTION_LOST;

/// Tri-state link health. Exactly one value holds at any time.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Observable link health: status plus the most recent failure reason.
///
/// `last_error` is cleared on every transition to `Connected` and set by
/// every failed probe, failed channel open, and channel error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionState {
    pub status: ConnectionStatus,
    pub last_error: Option<String>,
}

/// Input to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkSignal {
    /// The persistent status channel opened.
    ChannelOpened,
    /// The status channel failed to open, errored, or was closed by the peer.
    ChannelFailed,
    /// A liveness probe succeeded.
    ProbeSucceeded,
    /// A liveness probe failed, with the failure reason when one exists.
    ProbeFailed(Option<String>),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// State after `start()`: `Connecting`, previous error retained.
    pub fn begin_connecting(&self) -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            last_error: self.last_error.clone(),
        }
    }

    /// Apply one signal and return the next state.
    ///
    /// A failed probe only refreshes the error while `Disconnected`; the
    /// poller never runs in any other state, so a stale completion is a
    /// no-op.
    pub fn apply(&self, signal: &LinkSignal) -> Self {
        match signal {
            LinkSignal::ChannelOpened | LinkSignal::ProbeSucceeded => Self {
                status: ConnectionStatus::Connected,
                last_error: None,
            },
            LinkSignal::ChannelFailed => Self {
                status: ConnectionStatus::Disconnected,
                last_error: Some(CONNECTION_LOST.to_owned()),
            },
            LinkSignal::ProbeFailed(reason) if self.status == ConnectionStatus::Disconnected => {
                let reason = reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .unwrap_or(CONNECTION_LOST);
                Self {
                    status: ConnectionStatus::Disconnected,
                    last_error: Some(reason.to_owned()),
                }
            }
            LinkSignal::ProbeFailed(_) => self.clone(),
        }
    }
}
