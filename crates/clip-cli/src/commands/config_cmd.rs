//! Config subcommand handlers.

use std::io::IsTerminal;

use clap::ValueEnum;
use dialoguer::{Input, Select};

use clip_config::{Config, DaemonSection, Defaults};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

const OUTPUT_CHOICES: [&str; 5] = ["table", "json", "json-compact", "yaml", "plain"];

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// The name clap accepts for a value-enum variant.
fn value_name<T: ValueEnum>(value: &T) -> String {
    value
        .to_possible_value()
        .map(|v| v.get_name().to_owned())
        .unwrap_or_default()
}

/// The configuration as `clipctl` would use it, flags applied.
fn resolved(global: &GlobalOpts, cfg: &Config) -> Config {
    Config {
        daemon: config::resolve_section(global, cfg),
        defaults: Defaults {
            output: value_name(&global.output()),
            color: value_name(&global.color()),
        },
    }
}

fn render_toml(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# failed to render config: {e}"))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &mut GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        ConfigCommand::Show => {
            let cfg = config::load()?;
            config::apply_defaults(global, &cfg)?;
            let view = resolved(global, &cfg);
            // Surface validation problems, but still show the file.
            if let Err(e) = clip_config::to_daemon_config(&view.daemon) {
                tracing::warn!(error = %e, "configuration is not usable as-is");
            }
            let out = output::render_single(&global.output(), &view, render_toml, |_| {
                config::config_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: "interactive".into(),
            reason: "config init needs a terminal; write the file by hand instead".into(),
        });
    }

    let config_path = config::config_path();
    eprintln!("clipctl configuration");
    eprintln!("   Config path: {}\n", config_path.display());

    if config_path.exists()
        && !util::confirm("A config file already exists. Overwrite it?", "config init", global.yes)?
    {
        return Ok(());
    }

    let defaults = DaemonSection::default();

    // 1. Daemon URL
    let url: String = Input::new()
        .with_prompt("Daemon URL")
        .default(global.daemon.clone().unwrap_or(defaults.url))
        .validate_with(|input: &String| -> Result<(), String> {
            clip_config::parse_daemon_url(input)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    // 2. Probe spacing
    let poll_interval: String = Input::new()
        .with_prompt("Reconnect probe interval")
        .default(defaults.poll_interval)
        .validate_with(|input: &String| -> Result<(), String> {
            clip_config::parse_interval("poll_interval", input)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    // 3. Output format
    let selection = Select::new()
        .with_prompt("Default output format")
        .items(&OUTPUT_CHOICES)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    let output = OUTPUT_CHOICES
        .get(selection)
        .copied()
        .unwrap_or("table")
        .to_owned();

    let cfg = Config {
        daemon: DaemonSection {
            url,
            poll_interval,
            ..DaemonSection::default()
        },
        defaults: Defaults {
            output,
            ..Defaults::default()
        },
    };
    clip_config::to_daemon_config(&cfg.daemon)?;

    let written = clip_config::save_config(&cfg)?;
    eprintln!("\nConfiguration written to {}", written.display());
    eprintln!("  Test it: clipctl status");
    Ok(())
}
