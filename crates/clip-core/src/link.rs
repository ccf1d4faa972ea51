// ── Daemon link seam ──
//
// The four endpoints the supervisor and ingestor consume, behind a trait
// so the core logic is independent of the transport. `DaemonClient`
// (HTTP + SSE) is the shipped implementation; tests script their own.

use std::pin::Pin;

use clip_api::{DaemonClient, LogEvent, SseEvent};
use futures_core::Stream;
use futures_util::StreamExt;

use crate::error::CoreError;

/// A persistent server-pushed channel as seen by the core.
pub type EventChannel = Pin<Box<dyn Stream<Item = Result<SseEvent, CoreError>> + Send>>;

/// Link to a local capture daemon.
#[trait_variant::make(DaemonLink: Send)]
pub trait LocalDaemonLink {
    /// Lightweight liveness check; no payload semantics.
    async fn probe(&self) -> Result<(), CoreError>;

    /// Open the persistent connection-status channel. `Ok` means the
    /// channel is open.
    async fn open_status_channel(&self) -> Result<EventChannel, CoreError>;

    /// One-shot fetch of retained history, oldest first (possibly empty).
    async fn recent_logs(&self) -> Result<Vec<LogEvent>, CoreError>;

    /// Open the persistent live log channel.
    async fn open_log_channel(&self) -> Result<EventChannel, CoreError>;
}

fn into_core_channel(channel: clip_api::EventChannel) -> EventChannel {
    Box::pin(channel.map(|item| item.map_err(CoreError::from)))
}

impl DaemonLink for DaemonClient {
    async fn probe(&self) -> Result<(), CoreError> {
        Ok(DaemonClient::probe(self).await?)
    }

    async fn open_status_channel(&self) -> Result<EventChannel, CoreError> {
        let channel = DaemonClient::open_status_channel(self).await?;
        Ok(into_core_channel(channel))
    }

    async fn recent_logs(&self) -> Result<Vec<LogEvent>, CoreError> {
        Ok(DaemonClient::recent_logs(self).await?)
    }

    async fn open_log_channel(&self) -> Result<EventChannel, CoreError> {
        let channel = DaemonClient::open_log_channel(self).await?;
        Ok(into_core_channel(channel))
    }
}
