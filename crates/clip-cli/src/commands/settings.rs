//! Settings command handlers.

use clip_core::{Command as CoreCommand, CommandResult, Daemon, DaemonConfig, UserSettings};

use crate::cli::{GlobalOpts, SettingsArgs, SettingsCommand, SettingsSetArgs};
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(s: &UserSettings) -> String {
    output::detail_block(&[
        ("Video device", s.video_device_id.clone()),
        ("Audio device", s.audio_device_id.clone()),
        ("Encoder", s.video_encoder_id.clone()),
        ("Framerate", format!("{} fps", s.framerate)),
        ("Bitrate", format!("{} kbps", s.bitrate_kbps)),
    ])
}

/// Overlay the flags that were given onto the stored settings.
fn merge(mut base: UserSettings, args: SettingsSetArgs) -> UserSettings {
    if let Some(v) = args.video_device {
        base.video_device_id = v;
    }
    if let Some(v) = args.audio_device {
        base.audio_device_id = v;
    }
    if let Some(v) = args.encoder {
        base.video_encoder_id = v;
    }
    if let Some(v) = args.framerate {
        base.framerate = v;
    }
    if let Some(v) = args.bitrate {
        base.bitrate_kbps = v;
    }
    base
}

fn has_field_flags(args: &SettingsSetArgs) -> bool {
    args.video_device.is_some()
        || args.audio_device.is_some()
        || args.encoder.is_some()
        || args.framerate.is_some()
        || args.bitrate.is_some()
}

pub async fn handle(
    config: DaemonConfig,
    args: SettingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let settings = match args.command {
        SettingsCommand::Get => {
            Daemon::oneshot(config, |d| async move { d.settings().await }).await?
        }

        SettingsCommand::Set(set) => {
            let replacement = match set.from_file {
                Some(ref path) => Some(util::read_json_file::<UserSettings>(path)?),
                None if has_field_flags(&set) => None,
                None => {
                    return Err(CliError::Validation {
                        field: "settings".into(),
                        reason: "pass --from-file or at least one field flag".into(),
                    });
                }
            };

            let stored = Daemon::oneshot(config, |d| async move {
                let next = match replacement {
                    Some(full) => full,
                    None => merge(d.settings().await?, set),
                };
                d.execute(CoreCommand::UpdateSettings(next)).await
            })
            .await?;

            util::notify("Settings updated", global.quiet);
            match stored {
                CommandResult::Settings(s) => s,
                other => {
                    return Err(CliError::Internal(format!(
                        "unexpected daemon reply: {other:?}"
                    )));
                }
            }
        }
    };

    let out = output::render_single(&global.output(), &settings, detail, |s| {
        s.video_device_id.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> UserSettings {
        UserSettings {
            video_device_id: "screen:0".into(),
            audio_device_id: "loopback".into(),
            video_encoder_id: "libx264".into(),
            framerate: 30,
            bitrate_kbps: 6000,
        }
    }

    #[test]
    fn merge_only_touches_given_fields() {
        let args = SettingsSetArgs {
            from_file: None,
            video_device: None,
            audio_device: None,
            encoder: Some("h264_nvenc".into()),
            framerate: Some(60),
            bitrate: None,
        };
        assert!(has_field_flags(&args));

        let merged = merge(stored(), args);
        assert_eq!(merged.video_encoder_id, "h264_nvenc");
        assert_eq!(merged.framerate, 60);
        assert_eq!(merged.video_device_id, "screen:0");
        assert_eq!(merged.bitrate_kbps, 6000);
    }
}
