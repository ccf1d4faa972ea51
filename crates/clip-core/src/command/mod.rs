// ── Command API ──
//
// All daemon write operations flow through a unified `Command` enum,
// routed by the daemon's command processor task.

use clip_api::{CaptureConfig, ClipResponse, UserSettings};

use crate::error::CoreError;

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All write operations against the capture daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the persisted user settings.
    UpdateSettings(UserSettings),
    /// Switch the live capture pipeline.
    SetCapture(CaptureConfig),
    /// Flush the ring buffer to a new clip file.
    SaveClip,
    /// Ask the daemon to exit.
    Shutdown,
}

impl Command {
    /// Short name for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UpdateSettings(_) => "update-settings",
            Self::SetCapture(_) => "set-capture",
            Self::SaveClip => "save-clip",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Result of a successfully executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Settings as stored by the daemon after validation.
    Settings(UserSettings),
    /// The command succeeded with no payload.
    Ok,
    /// Summary of the saved clip.
    Clip(ClipResponse),
    /// The daemon acknowledged the shutdown request.
    ShuttingDown(bool),
}
