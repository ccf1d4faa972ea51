// Daemon status and connection heartbeat endpoints
//
// `/status` is the one-shot capture snapshot; `/connection` is the
// persistent heartbeat channel (a `connected` event on open, then a
// `ping` every few seconds) used to track reachability.

use tracing::debug;

use crate::client::DaemonClient;
use crate::error::Error;
use crate::models::{ShutdownResponse, StatusResponse};
use crate::sse::EventChannel;

impl DaemonClient {
    /// Fetch the capture status snapshot.
    ///
    /// `GET /status`
    pub async fn status(&self) -> Result<StatusResponse, Error> {
        self.get("/status").await
    }

    /// Lightweight reachability check.
    ///
    /// Succeeds when the daemon answers `/status` with any 2xx; the body
    /// is not decoded, so a schema change can't masquerade as an outage.
    pub async fn probe(&self) -> Result<(), Error> {
        let url = self.api_url("/status")?;
        debug!("probing {}", url);
        let _: serde_json::Value = self.get("/status").await?;
        Ok(())
    }

    /// Open the connection heartbeat channel.
    ///
    /// `GET /connection` (`text/event-stream`)
    pub async fn open_status_channel(&self) -> Result<EventChannel, Error> {
        self.open_channel("/connection").await
    }

    /// Ask the daemon to exit.
    ///
    /// `POST /shutdown`
    pub async fn shutdown(&self) -> Result<ShutdownResponse, Error> {
        self.post_empty("/shutdown").await
    }
}
