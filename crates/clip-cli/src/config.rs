//! CLI-side configuration: flag overrides layered on top of `clip-config`.
//!
//! Core never sees these types -- it receives a pre-built `DaemonConfig`.

use clap::ValueEnum;

use clip_config::{Config, DaemonSection};
use clip_core::DaemonConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use clip_config::config_path;

/// Load the file + env configuration.
pub fn load() -> Result<Config, CliError> {
    Ok(clip_config::load_config()?)
}

/// Fill unset `--output` / `--color` flags from the config defaults.
pub fn apply_defaults(global: &mut GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    if global.output.is_none() {
        let output = OutputFormat::from_str(&cfg.defaults.output, true).map_err(|_| {
            CliError::Validation {
                field: "defaults.output".into(),
                reason: format!("unknown output format '{}'", cfg.defaults.output),
            }
        })?;
        global.output = Some(output);
    }
    if global.color.is_none() {
        let color = ColorMode::from_str(&cfg.defaults.color, true).map_err(|_| {
            CliError::Validation {
                field: "defaults.color".into(),
                reason: format!("unknown color mode '{}'", cfg.defaults.color),
            }
        })?;
        global.color = Some(color);
    }
    Ok(())
}

/// The `[daemon]` section with CLI flag overrides applied.
pub fn resolve_section(global: &GlobalOpts, cfg: &Config) -> DaemonSection {
    let mut section = cfg.daemon.clone();
    if let Some(ref url) = global.daemon {
        section.url.clone_from(url);
    }
    if let Some(ref timeout) = global.timeout {
        section.timeout.clone_from(timeout);
    }
    if let Some(ref interval) = global.poll_interval {
        section.poll_interval.clone_from(interval);
    }
    section
}

/// Build a validated `DaemonConfig` from the config file and CLI flags.
pub fn daemon_config(global: &GlobalOpts, cfg: &Config) -> Result<DaemonConfig, CliError> {
    Ok(clip_config::to_daemon_config(&resolve_section(global, cfg))?)
}
