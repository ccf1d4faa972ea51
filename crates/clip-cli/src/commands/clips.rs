//! Clip command handlers.

use std::time::Duration;

use tabled::Tabled;

use clip_core::{
    ClipInfo, ClipResponse, Command as CoreCommand, CommandResult, Daemon, DaemonConfig,
};

use crate::cli::{ClipArgs, ClipCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ClipRow {
    #[tabled(rename = "File")]
    filename: String,
    #[tabled(rename = "Size")]
    size: String,
}

/// Human-readable byte count (binary units, one decimal).
fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024 * 1024 && unit < UNITS.len() - 1 {
        value /= 1024;
        unit += 1;
    }
    let whole = value / 1024;
    let tenth = (value % 1024) * 10 / 1024;
    format!("{whole}.{tenth} {}", UNITS[unit])
}

fn saved_detail(c: &ClipResponse) -> String {
    output::detail_block(&[
        ("File", c.filename.clone()),
        ("Duration", format!("{:.1}s", Duration::from_millis(c.duration_ms).as_secs_f64())),
        ("Packets", c.packets.to_string()),
        ("Size", human_bytes(u64::try_from(c.bytes).unwrap_or(u64::MAX))),
    ])
}

pub async fn handle(
    config: DaemonConfig,
    args: ClipArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let format = global.output();
    let out = match args.command {
        ClipCommand::Save => {
            let result =
                Daemon::oneshot(config, |d| async move { d.execute(CoreCommand::SaveClip).await })
                    .await?;
            let CommandResult::Clip(clip) = result else {
                return Err(CliError::Internal(format!(
                    "unexpected daemon reply: {result:?}"
                )));
            };
            output::render_single(&format, &clip, saved_detail, |c| c.filename.clone())?
        }
        ClipCommand::List => {
            let clips: Vec<ClipInfo> =
                Daemon::oneshot(config, |d| async move { d.clips().await }).await?;
            output::render_list(
                &format,
                &clips,
                |c| ClipRow {
                    filename: c.filename.clone(),
                    size: human_bytes(c.size_bytes),
                },
                |c| c.filename.clone(),
            )?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
