//! Shared configuration for clipctl.
//!
//! TOML file + `CLIPCTL_*` environment layering, and translation to
//! `clip_core::DaemonConfig`. The CLI adds flag overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use clip_core::DaemonConfig;
use clip_core::config::DEFAULT_DAEMON_URL;
use clip_core::telemetry::DEFAULT_LOG_CAPACITY;

/// Prefix for environment overrides. Nested keys use `__`
/// (e.g. `CLIPCTL_DAEMON__POLL_INTERVAL=5s`).
pub const ENV_PREFIX: &str = "CLIPCTL_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// How to reach and supervise the daemon.
    #[serde(default)]
    pub daemon: DaemonSection,

    /// Output defaults.
    #[serde(default)]
    pub defaults: Defaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DaemonSection {
    /// Daemon base URL.
    #[serde(default = "default_url")]
    pub url: String,

    /// One-shot request timeout, humantime format ("10s", "1m").
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// Spacing of liveness probes while disconnected.
    #[serde(default = "default_interval")]
    pub poll_interval: String,

    /// Delay before the log channel is reopened.
    #[serde(default = "default_interval")]
    pub reconnect_interval: String,

    /// Retained log entries.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
}

impl Default for DaemonSection {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout: default_timeout(),
            poll_interval: default_interval(),
            reconnect_interval: default_interval(),
            log_capacity: default_log_capacity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_url() -> String {
    DEFAULT_DAEMON_URL.into()
}
fn default_timeout() -> String {
    "10s".into()
}
fn default_interval() -> String {
    "2s".into()
}
fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "clip", "clipctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("clipctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults, then `path` (if it exists), then `CLIPCTL_*` env vars.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation to core config ──────────────────────────────────────

/// Parse a humantime duration, rejecting zero.
pub fn parse_interval(field: &str, value: &str) -> Result<Duration, ConfigError> {
    let duration = humantime::parse_duration(value.trim()).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("'{value}' is not a duration: {e}"),
    })?;
    if duration.is_zero() {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(duration)
}

/// Parse the daemon base URL; only `http` and `https` are accepted.
pub fn parse_daemon_url(value: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = value.parse().map_err(|_| ConfigError::Validation {
        field: "daemon.url".into(),
        reason: format!("invalid URL: {value}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Validation {
            field: "daemon.url".into(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

/// Build a validated `DaemonConfig` from the `[daemon]` section.
pub fn to_daemon_config(section: &DaemonSection) -> Result<DaemonConfig, ConfigError> {
    if section.log_capacity == 0 {
        return Err(ConfigError::Validation {
            field: "daemon.log_capacity".into(),
            reason: "must be at least 1".into(),
        });
    }

    Ok(DaemonConfig {
        url: parse_daemon_url(&section.url)?,
        timeout: parse_interval("daemon.timeout", &section.timeout)?,
        poll_interval: parse_interval("daemon.poll_interval", &section.poll_interval)?,
        reconnect_interval: parse_interval(
            "daemon.reconnect_interval",
            &section.reconnect_interval,
        )?,
        log_capacity: section.log_capacity,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_translate_to_local_daemon() {
        let config = to_daemon_config(&DaemonSection::default()).unwrap();
        assert_eq!(config, DaemonConfig::local().unwrap());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[daemon]\nurl = \"http://127.0.0.1:50000\"\npoll_interval = \"500ms\"\n",
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.daemon.url, "http://127.0.0.1:50000");
        assert_eq!(config.daemon.timeout, "10s");
        assert_eq!(config.defaults, Defaults::default());

        let daemon = to_daemon_config(&config.daemon).unwrap();
        assert_eq!(daemon.poll_interval, Duration::from_millis(500));
        assert_eq!(daemon.reconnect_interval, Duration::from_secs(2));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.daemon, DaemonSection::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.daemon.log_capacity = 250;
        cfg.defaults.output = "json".into();

        save_config_to(&cfg, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let section = DaemonSection {
            poll_interval: "0s".into(),
            ..DaemonSection::default()
        };
        let err = to_daemon_config(&section).unwrap_err();
        assert!(err.to_string().contains("daemon.poll_interval"));
    }

    #[test]
    fn garbage_duration_is_rejected() {
        assert!(parse_interval("daemon.timeout", "soon").is_err());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let section = DaemonSection {
            log_capacity: 0,
            ..DaemonSection::default()
        };
        assert!(to_daemon_config(&section).is_err());
    }

    #[test]
    fn non_http_url_is_rejected() {
        assert!(parse_daemon_url("ftp://127.0.0.1").is_err());
        assert!(parse_daemon_url("not a url").is_err());
    }
}
