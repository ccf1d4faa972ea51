//! Capture pipeline handlers.

use clip_core::{CaptureConfig, Command as CoreCommand, Daemon, DaemonConfig};

use crate::cli::{CaptureArgs, CaptureCommand, GlobalOpts};
use crate::error::CliError;

use super::util;

pub async fn handle(
    config: DaemonConfig,
    args: CaptureArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CaptureCommand::Set {
            video_device,
            audio_device,
            framerate,
        } => {
            if framerate == 0 {
                return Err(CliError::Validation {
                    field: "framerate".into(),
                    reason: "must be greater than zero".into(),
                });
            }
            let capture = CaptureConfig {
                video_device_id: video_device,
                audio_device_id: audio_device,
                framerate,
            };
            Daemon::oneshot(config, |d| async move {
                d.execute(CoreCommand::SetCapture(capture)).await
            })
            .await?;
            util::notify("Capture pipeline updated", global.quiet);
            Ok(())
        }
    }
}
