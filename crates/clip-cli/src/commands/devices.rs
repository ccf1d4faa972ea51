//! Device and encoder listing handlers.

use tabled::Tabled;

use clip_core::{AudioDevice, Daemon, DaemonConfig, VideoDevice, VideoEncoder};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct VideoDeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Kind")]
    kind: String,
}

#[derive(Tabled)]
struct AudioDeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Input")]
    input: String,
}

#[derive(Tabled)]
struct EncoderRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Hardware")]
    hardware: String,
    #[tabled(rename = "Memory")]
    memory: String,
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.into()
}

impl From<&VideoDevice> for VideoDeviceRow {
    fn from(d: &VideoDevice) -> Self {
        Self {
            id: d.id.clone(),
            label: d.label.clone(),
            kind: d.kind.to_string(),
        }
    }
}

impl From<&AudioDevice> for AudioDeviceRow {
    fn from(d: &AudioDevice) -> Self {
        Self {
            id: d.id.clone(),
            label: d.label.clone(),
            input: yes_no(d.is_input),
        }
    }
}

impl From<&VideoEncoder> for EncoderRow {
    fn from(e: &VideoEncoder) -> Self {
        Self {
            id: e.id.clone(),
            name: e.name.clone(),
            hardware: yes_no(e.is_hardware),
            memory: e.required_memory.clone().unwrap_or_else(|| "-".into()),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle(
    config: DaemonConfig,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let format = global.output();
    let out = match args.command {
        DevicesCommand::Video => {
            let devices =
                Daemon::oneshot(config, |d| async move { d.video_devices().await }).await?;
            output::render_list(&format, &devices, |d| VideoDeviceRow::from(d), |d| d.id.clone())?
        }
        DevicesCommand::Audio => {
            let devices =
                Daemon::oneshot(config, |d| async move { d.audio_devices().await }).await?;
            output::render_list(&format, &devices, |d| AudioDeviceRow::from(d), |d| d.id.clone())?
        }
        DevicesCommand::Microphone => {
            let devices =
                Daemon::oneshot(config, |d| async move { d.microphone_devices().await }).await?;
            output::render_list(&format, &devices, |d| AudioDeviceRow::from(d), |d| d.id.clone())?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle_encoders(config: DaemonConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let encoders = Daemon::oneshot(config, |d| async move { d.video_encoders().await }).await?;
    let out = output::render_list(&global.output(), &encoders, |e| EncoderRow::from(e), |e| {
        e.id.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
