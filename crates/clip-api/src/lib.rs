// clip-api: Async Rust client for the clip capture daemon (HTTP + Server-Sent Events)

pub mod client;
pub mod clips;
pub mod devices;
pub mod error;
pub mod logs;
pub mod models;
pub mod settings;
pub mod sse;
pub mod status;
pub mod transport;

pub use client::DaemonClient;
pub use error::Error;
pub use models::{
    AudioDevice, CaptureConfig, ClipInfo, ClipResponse, LogEvent, LogLevel, ShutdownResponse,
    StatusResponse, UserSettings, VideoDevice, VideoDeviceKind, VideoEncoder,
};
pub use sse::{EventChannel, SseDecoder, SseEvent};
pub use transport::TransportConfig;
