// Shared transport configuration for building reqwest::Client instances.
//
// The daemon client needs two HTTP clients: one for request/response
// calls bounded by a total timeout, and one for long-lived event channels
// where only the connect phase may time out.

use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("clipctl/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Total timeout for one-shot requests.
    pub timeout: Duration,
    /// Timeout for establishing the TCP connection (applies to channels too).
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(3),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` for one-shot requests.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(Error::Transport)
    }

    /// Build a `reqwest::Client` for persistent event channels.
    ///
    /// No total timeout: an SSE response body stays open for as long as
    /// the daemon keeps the channel alive.
    pub fn build_stream_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(Error::Transport)
    }

    pub(crate) fn timeout_secs(&self) -> u64 {
        self.timeout.as_secs()
    }
}
