// ── Runtime daemon configuration ──
//
// Describes *how* to reach and supervise the capture daemon. Core never
// reads config files; the CLI builds a `DaemonConfig` and hands it in.

use std::time::Duration;

use url::Url;

use crate::telemetry::DEFAULT_LOG_CAPACITY;

/// Default address of the daemon's local HTTP surface.
pub const DEFAULT_DAEMON_URL: &str = "http://127.0.0.1:43123";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(2);

/// Configuration for supervising a single local daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Daemon base URL (e.g., `http://127.0.0.1:43123`).
    pub url: Url,
    /// Timeout for one-shot requests (probe, backfill, commands).
    pub timeout: Duration,
    /// Spacing of liveness probes while disconnected.
    pub poll_interval: Duration,
    /// Delay before the log channel is reopened after an error.
    pub reconnect_interval: Duration,
    /// Maximum number of retained log entries.
    pub log_capacity: usize,
}

impl DaemonConfig {
    /// Configuration for the daemon at `url` with default tuning.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }

    /// Configuration for the daemon at its well-known local address.
    pub fn local() -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(DEFAULT_DAEMON_URL)?))
    }
}
