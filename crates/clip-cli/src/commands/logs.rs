//! Log command handlers: backfill + optional live follow.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use clip_core::{
    BackfillStatus, Daemon, DaemonConfig, LogChange, LogEvent, LogFilter, LogLevel,
};

use crate::cli::{GlobalOpts, LevelArg, LogsArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

fn level(arg: LevelArg) -> LogLevel {
    match arg {
        LevelArg::Debug => LogLevel::Debug,
        LevelArg::Info => LogLevel::Info,
        LevelArg::Warning => LogLevel::Warning,
        LevelArg::Error => LogLevel::Error,
    }
}

fn filter_from(args: &LogsArgs) -> LogFilter {
    LogFilter {
        min_level: args.level.map(level),
        source: args.source.clone(),
        pattern: args.grep.clone(),
        limit: args.limit,
    }
}

/// Render one entry for streaming output (one line per entry).
fn entry_line(format: &OutputFormat, event: &LogEvent, color: bool) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(output::log_line(event, color)),
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(event, true),
        OutputFormat::Yaml => Ok(format!("---\n{}", output::render_yaml(event)?)),
        OutputFormat::Plain => Ok(event.message.clone()),
    }
}

/// Render a batch. Structured formats emit one array/document.
fn render_batch(
    format: &OutputFormat,
    entries: &[Arc<LogEvent>],
    color: bool,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => output::render_json(entries, false),
        OutputFormat::JsonCompact => output::render_json(entries, true),
        OutputFormat::Yaml => output::render_yaml(entries),
        OutputFormat::Table | OutputFormat::Plain => render_lines(format, entries, color),
    }
}

fn render_lines(
    format: &OutputFormat,
    entries: &[Arc<LogEvent>],
    color: bool,
) -> Result<String, CliError> {
    entries
        .iter()
        .map(|e| entry_line(format, e, color))
        .collect::<Result<Vec<_>, _>>()
        .map(|lines| lines.join("\n"))
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: DaemonConfig,
    args: LogsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let timeout = config.timeout;
    let url = config.url.to_string();
    let filter = filter_from(&args);
    let format = global.output();
    let color = output::should_color(&global.color());

    let daemon = Daemon::new(config)?;
    let mut updates = daemon.log_updates();
    daemon.start_telemetry().await;

    let bar = util::spinner("Loading recent logs", global.quiet);
    let mut logs = daemon.logs();
    let settled = tokio::time::timeout(timeout, logs.backfill_settled()).await;
    util::finish_spinner(bar);

    let snapshot = match settled {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => logs.latest(),
        Err(_) => {
            daemon.disconnect().await;
            return Err(CliError::Timeout {
                seconds: timeout.as_secs(),
            });
        }
    };

    let initial = filter.apply(&snapshot.entries);
    let rendered = if args.follow {
        // Followed output is one line (or document) per entry throughout.
        render_lines(&format, &initial, color)
    } else {
        render_batch(&format, &initial, color)
    };
    match rendered {
        Ok(out) => output::print_output(&out, global.quiet),
        Err(e) => {
            daemon.disconnect().await;
            return Err(e);
        }
    }

    if !args.follow {
        daemon.disconnect().await;
        if snapshot.backfill == BackfillStatus::Failed {
            return Err(CliError::ConnectionFailed {
                url,
                source: "recent logs could not be loaded".into(),
            });
        }
        return Ok(());
    }

    // Follow: everything at or below the snapshot's seq was printed.
    let printed = snapshot.seq;
    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            update = updates.recv() => match update {
                Ok(update) if update.seq <= printed => {}
                Ok(update) => {
                    let fresh = match update.change {
                        LogChange::Appended(event) => vec![event],
                        LogChange::Backfill(history) => history,
                    };
                    let matching: Vec<_> =
                        fresh.into_iter().filter(|e| filter.matches(e)).collect();
                    match render_lines(&format, &matching, color) {
                        Ok(out) => output::print_output(&out, global.quiet),
                        Err(e) => break Err(e),
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "log output fell behind"),
                Err(RecvError::Closed) => break Ok(()),
            },
        }
    };

    daemon.disconnect().await;
    result
}
