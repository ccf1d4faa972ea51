//! Daemon shutdown handler.

use clip_core::{Command as CoreCommand, CommandResult, Daemon, DaemonConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

use super::util;

pub async fn handle(config: DaemonConfig, global: &GlobalOpts) -> Result<(), CliError> {
    if !util::confirm(
        "Stop the capture daemon? Unsaved replay buffer contents are lost.",
        "shutdown",
        global.yes,
    )? {
        return Ok(());
    }

    let result =
        Daemon::oneshot(config, |d| async move { d.execute(CoreCommand::Shutdown).await }).await?;

    match result {
        CommandResult::ShuttingDown(true) => util::notify("Daemon shutting down", global.quiet),
        _ => util::notify("Daemon did not acknowledge shutdown", global.quiet),
    }
    Ok(())
}
