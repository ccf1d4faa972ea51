//! Command dispatch: bridges CLI args -> core Daemon -> output formatting.

pub mod capture;
pub mod clips;
pub mod config_cmd;
pub mod devices;
pub mod logs;
pub mod settings;
pub mod shutdown;
pub mod status;
pub mod util;

use clip_core::DaemonConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a daemon-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: DaemonConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status(args) => status::handle(config, args, global).await,
        Command::Logs(args) => logs::handle(config, args, global).await,
        Command::Devices(args) => devices::handle(config, args, global).await,
        Command::Encoders => devices::handle_encoders(config, global).await,
        Command::Settings(args) => settings::handle(config, args, global).await,
        Command::Capture(args) => capture::handle(config, args, global).await,
        Command::Clip(args) => clips::handle(config, args, global).await,
        Command::Shutdown => shutdown::handle(config, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions do not reach the daemon".into(),
        )),
    }
}
