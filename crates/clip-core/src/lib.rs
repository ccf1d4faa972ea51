// clip-core: Link supervision and live telemetry between clip-api and consumers (CLI).

pub mod command;
pub mod config;
pub mod connection;
pub mod daemon;
pub mod error;
pub mod link;
pub mod stream;
pub mod telemetry;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::DaemonConfig;
pub use connection::{
    ConnectionState, ConnectionStatus, ConnectionStore, ConnectionSupervisor, LinkSignal,
};
pub use daemon::Daemon;
pub use error::CoreError;
pub use link::{DaemonLink, EventChannel, LocalDaemonLink};
pub use stream::{LogStream, LogWatchStream};
pub use telemetry::{
    BackfillStatus, LogBuffer, LogChange, LogFilter, LogUpdate, StreamPhase, TelemetryIngestor,
    TelemetrySnapshot,
};

// Wire types consumers need alongside the daemon handle.
pub use clip_api::{
    AudioDevice, CaptureConfig, ClipInfo, ClipResponse, LogEvent, LogLevel, StatusResponse,
    UserSettings, VideoDevice, VideoDeviceKind, VideoEncoder,
};
