// Log endpoints: recent history and the live log channel.

use crate::client::DaemonClient;
use crate::error::Error;
use crate::models::LogEvent;
use crate::sse::EventChannel;

impl DaemonClient {
    /// Fetch the daemon's retained log history, oldest first.
    ///
    /// `GET /logs/recent`
    pub async fn recent_logs(&self) -> Result<Vec<LogEvent>, Error> {
        self.get("/logs/recent").await
    }

    /// Open the live log channel. Each `log` event carries one JSON
    /// `LogEvent` in its data field.
    ///
    /// `GET /logs` (`text/event-stream`)
    pub async fn open_log_channel(&self) -> Result<EventChannel, Error> {
        self.open_channel("/logs").await
    }
}
