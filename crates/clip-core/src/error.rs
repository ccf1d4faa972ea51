// ── Core error types ──
//
// User-facing errors from clip-core. Consumers never see reqwest errors
// or JSON parse failures directly: the `From<clip_api::Error>` impl
// translates transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// `last_error` text used when a failure carries no better description.
pub const CONNECTION_LOST: &str = "Connection lost";

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to daemon at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// A daemon-dependent operation was attempted while the link is not
    /// `Connected`. Returned without touching the network.
    #[error("Daemon disconnected")]
    DaemonDisconnected,

    #[error("Daemon request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Event channel closed by daemon")]
    ChannelClosed,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Request rejected by daemon: {message}")]
    Rejected { message: String, status: u16 },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Text recorded as `ConnectionState::last_error` for this failure.
    pub fn connection_message(&self) -> String {
        match self {
            Self::ChannelClosed => CONNECTION_LOST.to_owned(),
            Self::ConnectionFailed { reason, .. } if reason.trim().is_empty() => {
                CONNECTION_LOST.to_owned()
            }
            Self::ConnectionFailed { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }

    /// Returns `true` for failures of the link itself (as opposed to the
    /// daemon answering with an error).
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::DaemonDisconnected
                | Self::Timeout { .. }
                | Self::ChannelClosed
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<clip_api::Error> for CoreError {
    fn from(err: clip_api::Error) -> Self {
        match err {
            clip_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            clip_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            clip_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            clip_api::Error::Http {
                status: 404,
                message,
            } => CoreError::NotFound { resource: message },
            clip_api::Error::Http { status, message } if (400..500).contains(&status) => {
                CoreError::Rejected { message, status }
            }
            clip_api::Error::Http { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            clip_api::Error::NotEventStream { content_type } => CoreError::Api {
                message: format!("expected an event stream, got '{content_type}'"),
                status: None,
            },
            clip_api::Error::ChannelClosed => CoreError::ChannelClosed,
            clip_api::Error::Deserialization { message, .. } => CoreError::Api {
                message: format!("Invalid response from daemon: {message}"),
                status: None,
            },
        }
    }
}
