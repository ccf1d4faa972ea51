// Wire models for the daemon's JSON payloads.
//
// Field names match the daemon's serde output exactly (snake_case), so
// no renames are needed except for the lowercase enums.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

// ── Logs ─────────────────────────────────────────────────────────────

/// Severity of a daemon log line.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    #[strum(to_string = "warning", serialize = "warn")]
    Warning,
    Error,
}

/// One log line, either pushed by the daemon or synthesized locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// ISO-8601 timestamp as emitted by the producer.
    pub timestamp: String,
    pub level: LogLevel,
    pub source: String,
    pub message: String,
}

impl LogEvent {
    /// Source name used for entries fabricated by this client rather than
    /// received from the daemon.
    pub const SYSTEM_SOURCE: &'static str = "system";

    /// Build a locally-synthesized entry stamped with the current time.
    pub fn system(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            source: Self::SYSTEM_SOURCE.to_owned(),
            message: message.into(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.source == Self::SYSTEM_SOURCE
    }
}

// ── Status ───────────────────────────────────────────────────────────

/// Active capture configuration (`POST /config/capture` body and part of `/status`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub video_device_id: String,
    #[serde(default)]
    pub audio_device_id: Option<String>,
    pub framerate: u32,
}

/// `GET /status` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub capture_config: CaptureConfig,
    pub buffering: bool,
    pub buffer_seconds: u32,
    pub ring_buffer_packets: usize,
}

/// `POST /shutdown` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutdownResponse {
    pub shutting_down: bool,
}

// ── Devices & encoders ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VideoDeviceKind {
    Screen,
    Camera,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDevice {
    pub id: String,
    pub label: String,
    pub kind: VideoDeviceKind,
    /// Platform-specific capability blob; shape varies by backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioDevice {
    pub id: String,
    pub label: String,
    pub is_input: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEncoder {
    pub id: String,
    pub name: String,
    pub is_hardware: bool,
    #[serde(default)]
    pub required_memory: Option<String>,
}

// ── Settings ─────────────────────────────────────────────────────────

/// Persisted user settings (`GET`/`POST /settings`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub video_device_id: String,
    pub audio_device_id: String,
    pub video_encoder_id: String,
    pub framerate: u32,
    pub bitrate_kbps: u32,
}

// ── Clips ────────────────────────────────────────────────────────────

/// `POST /clip` response: summary of the clip written from the ring buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipResponse {
    pub filename: String,
    pub packets: usize,
    pub duration_ms: u64,
    pub bytes: usize,
}

/// One entry of `GET /clips`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipInfo {
    pub filename: String,
    pub size_bytes: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn log_level_accepts_warn_alias() {
        let event: LogEvent = serde_json::from_str(
            r#"{"timestamp":"2026-01-01T00:00:00Z","level":"warn","source":"capture","message":"slow"}"#,
        )
        .unwrap();
        assert_eq!(event.level, LogLevel::Warning);
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!(LogLevel::Warning.to_string(), "warning");
    }

    #[test]
    fn log_levels_are_ordered_by_severity() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn system_event_is_marked() {
        let event = LogEvent::system(LogLevel::Warning, "Log stream disconnected");
        assert!(event.is_system());
        assert_eq!(event.source, "system");
        assert!(chrono::DateTime::parse_from_rfc3339(&event.timestamp).is_ok());
    }

    #[test]
    fn status_response_without_audio_device() {
        let status: StatusResponse = serde_json::from_value(serde_json::json!({
            "capture_config": { "video_device_id": "screen:0", "framerate": 60 },
            "buffering": true,
            "buffer_seconds": 30,
            "ring_buffer_packets": 1200
        }))
        .unwrap();
        assert_eq!(status.capture_config.audio_device_id, None);
        assert!(status.buffering);
    }
}
