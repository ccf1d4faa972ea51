use thiserror::Error;

/// Top-level error type for the `clip-api` crate.
///
/// Covers every failure mode of the daemon's local surface: transport,
/// HTTP status, payload decoding, and the server-pushed event channels.
/// `clip-core` maps these into connection-level diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, reset, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── HTTP ────────────────────────────────────────────────────────
    /// Non-success status from the daemon. `message` comes from the
    /// daemon's `{"message": "..."}` error body when it sends one.
    #[error("Daemon returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── Event channels ──────────────────────────────────────────────
    /// The endpoint answered, but not with `text/event-stream`.
    #[error("Expected an event stream, got content type '{content_type}'")]
    NotEventStream { content_type: String },

    /// The daemon closed a persistent event channel.
    #[error("Event channel closed by daemon")]
    ChannelClosed,

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the daemon could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout(),
            Self::Timeout { .. } | Self::ChannelClosed => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status >= 500,
            other => other.is_unreachable(),
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Http { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status code, when the daemon answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        let err = Error::Http {
            status: 503,
            message: "restarting".into(),
        };
        assert!(err.is_transient());
        assert!(!err.is_unreachable());
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn client_errors_are_not_transient() {
        let err = Error::Http {
            status: 400,
            message: "unknown video device".into(),
        };
        assert!(!err.is_transient());
        assert!(!err.is_not_found());
    }

    #[test]
    fn closed_channel_counts_as_unreachable() {
        assert!(Error::ChannelClosed.is_unreachable());
        assert!(Error::ChannelClosed.is_transient());
    }
}
