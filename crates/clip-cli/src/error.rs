//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use clip_config::ConfigError;
use clip_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to daemon at {url}")]
    #[diagnostic(
        code(clipctl::connection_failed),
        help(
            "Check that the capture daemon is running.\n\
             URL: {url}\n\
             Try: clipctl status --watch"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Daemon disconnected")]
    #[diagnostic(
        code(clipctl::disconnected),
        help("The daemon link dropped. Retry once `clipctl status` reports connected.")
    )]
    Disconnected,

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource} not found")]
    #[diagnostic(code(clipctl::not_found))]
    NotFound { resource: String },

    // ── Daemon ───────────────────────────────────────────────────────

    #[error("Daemon rejected the request: {message}")]
    #[diagnostic(
        code(clipctl::rejected),
        help("Run: clipctl devices video / clipctl encoders to see valid IDs")
    )]
    Rejected { message: String },

    #[error("Daemon error: {message}")]
    #[diagnostic(code(clipctl::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(clipctl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(clipctl::config),
        help("Check the file at `clipctl config path` and any CLIPCTL_* environment variables.")
    )]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(clipctl::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(clipctl::timeout),
        help("Increase timeout with --timeout or check daemon responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(clipctl::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    #[diagnostic(code(clipctl::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(clipctl::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Disconnected => exit_code::CONNECTION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::DaemonDisconnected | CoreError::ChannelClosed => Self::Disconnected,

            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },

            CoreError::NotFound { resource } => Self::NotFound { resource },

            CoreError::Rejected { message, status: _ } => Self::Rejected { message },

            CoreError::Api { message, status: _ } => Self::ApiError { message },

            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}
