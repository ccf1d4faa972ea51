//! Status command handlers.

use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use clip_core::{ConnectionState, Daemon, DaemonConfig, StatusResponse};

use crate::cli::{GlobalOpts, OutputFormat, StatusArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Views ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StatusView {
    link: ConnectionState,
    capture: Option<StatusResponse>,
}

fn detail(view: &StatusView, color: bool) -> String {
    let mut pairs = vec![("Link", output::paint_status(view.link.status, color))];
    if let Some(ref err) = view.link.last_error {
        pairs.push(("Last error", err.clone()));
    }
    if let Some(ref status) = view.capture {
        let capture = &status.capture_config;
        pairs.push(("Video device", capture.video_device_id.clone()));
        pairs.push((
            "Audio device",
            capture.audio_device_id.clone().unwrap_or_else(|| "-".into()),
        ));
        pairs.push(("Framerate", format!("{} fps", capture.framerate)));
        pairs.push((
            "Buffering",
            if status.buffering { "yes" } else { "no" }.into(),
        ));
        pairs.push((
            "Replay buffer",
            format!(
                "{}s ({} packets)",
                status.buffer_seconds, status.ring_buffer_packets
            ),
        ));
    }
    output::detail_block(&pairs)
}

/// One line per transition; structured formats emit one document each.
fn transition_line(
    format: &OutputFormat,
    state: &ConnectionState,
    color: bool,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(state, true),
        OutputFormat::Yaml => Ok(format!("---\n{}", output::render_yaml(state)?)),
        OutputFormat::Plain => Ok(state.status.to_string()),
        OutputFormat::Table => {
            let time = chrono::Local::now().format("%H:%M:%S");
            let status = output::paint_status(state.status, color);
            Ok(match state.last_error {
                Some(ref err) => format!("{time} {status} ({err})"),
                None => format!("{time} {status}"),
            })
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: DaemonConfig,
    args: StatusArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if args.watch {
        return watch(config, global).await;
    }

    let timeout = config.timeout;
    let daemon = Daemon::new(config)?;

    let bar = util::spinner("Connecting to daemon", global.quiet);
    daemon.connect().await;
    let linked = daemon.await_link(timeout).await;
    let link = daemon.connection_snapshot();
    let capture = if linked.is_ok() {
        Some(daemon.status().await).transpose()
    } else {
        Ok(None)
    };
    daemon.disconnect().await;
    util::finish_spinner(bar);

    let view = StatusView {
        link,
        capture: capture?,
    };
    let color = output::should_color(&global.color());
    let out = output::render_single(
        &global.output(),
        &view,
        |v| detail(v, color),
        |v| v.link.status.to_string(),
    )?;
    output::print_output(&out, global.quiet);

    Ok(linked?)
}

/// Print every link transition until Ctrl-C.
async fn watch(config: DaemonConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let daemon = Daemon::new(config)?;
    let mut transitions = daemon.transitions();
    daemon.connect().await;

    let format = global.output();
    let color = output::should_color(&global.color());

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            state = transitions.recv() => match state {
                Ok(state) => match transition_line(&format, &state, color) {
                    Ok(line) => output::print_output(&line, global.quiet),
                    Err(e) => break Err(e),
                },
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "missed link transitions"),
                Err(RecvError::Closed) => break Ok(()),
            },
        }
    };

    daemon.disconnect().await;
    result
}
