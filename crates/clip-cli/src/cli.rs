//! Clap derive structures for the `clipctl` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// clipctl -- control and observe the local clip capture daemon
#[derive(Debug, Parser)]
#[command(
    name = "clipctl",
    version,
    about = "Control and observe the local clip capture daemon",
    long_about = "Talks to the capture daemon's local HTTP surface.\n\n\
        Watches link health, tails live daemon logs, and drives capture,\n\
        settings and clip commands.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Daemon base URL (overrides config)
    #[arg(long, short = 'd', env = "CLIPCTL_DAEMON_URL", global = true)]
    pub daemon: Option<String>,

    /// Output format [default: table]
    #[arg(long, short = 'o', env = "CLIPCTL_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout, e.g. "10s" (overrides config)
    #[arg(long, env = "CLIPCTL_TIMEOUT", global = true)]
    pub timeout: Option<String>,

    /// Probe spacing while disconnected, e.g. "2s" (overrides config)
    #[arg(long, global = true)]
    pub poll_interval: Option<String>,
}

impl GlobalOpts {
    pub fn output(&self) -> OutputFormat {
        self.output.clone().unwrap_or(OutputFormat::Table)
    }

    pub fn color(&self) -> ColorMode {
        self.color.clone().unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show daemon link health and capture status
    #[command(alias = "st")]
    Status(StatusArgs),

    /// Show and follow daemon logs
    Logs(LogsArgs),

    /// List capture devices
    #[command(alias = "dev")]
    Devices(DevicesArgs),

    /// List available video encoders
    Encoders,

    /// View and change persisted user settings
    Settings(SettingsArgs),

    /// Control the live capture pipeline
    Capture(CaptureArgs),

    /// Save and list clips
    Clip(ClipArgs),

    /// Ask the daemon to exit
    Shutdown,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STATUS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Keep running and print every link state change (Ctrl-C to stop)
    #[arg(long, short = 'w')]
    pub watch: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Keep streaming new entries (Ctrl-C to stop)
    #[arg(long, short = 'f')]
    pub follow: bool,

    /// Minimum severity
    #[arg(long, short = 'l', value_enum)]
    pub level: Option<LevelArg>,

    /// Only entries from this source (case-insensitive)
    #[arg(long, short = 's')]
    pub source: Option<String>,

    /// Only entries whose message contains this text (case-insensitive)
    #[arg(long, short = 'g')]
    pub grep: Option<String>,

    /// Show at most this many of the newest entries
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LevelArg {
    Debug,
    Info,
    #[value(alias = "warn")]
    Warning,
    Error,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// Screens and cameras
    Video,

    /// System audio sources
    Audio,

    /// Microphone inputs
    #[command(alias = "mic")]
    Microphone,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SETTINGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show the stored settings
    Get,

    /// Update settings; unset fields keep their stored values
    Set(SettingsSetArgs),
}

#[derive(Debug, Args)]
pub struct SettingsSetArgs {
    /// Read the full settings object from a JSON file
    #[arg(
        long,
        short = 'F',
        conflicts_with_all = ["video_device", "audio_device", "encoder", "framerate", "bitrate"]
    )]
    pub from_file: Option<PathBuf>,

    /// Video device ID
    #[arg(long)]
    pub video_device: Option<String>,

    /// Audio device ID
    #[arg(long)]
    pub audio_device: Option<String>,

    /// Video encoder ID
    #[arg(long)]
    pub encoder: Option<String>,

    /// Capture framerate
    #[arg(long)]
    pub framerate: Option<u32>,

    /// Encoder bitrate in kbps
    #[arg(long)]
    pub bitrate: Option<u32>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CAPTURE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CaptureArgs {
    #[command(subcommand)]
    pub command: CaptureCommand,
}

#[derive(Debug, Subcommand)]
pub enum CaptureCommand {
    /// Switch the capture pipeline to new devices
    Set {
        /// Video device ID
        #[arg(long, required = true)]
        video_device: String,

        /// Audio device ID
        #[arg(long)]
        audio_device: Option<String>,

        /// Capture framerate
        #[arg(long, default_value = "60")]
        framerate: u32,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CLIP
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ClipArgs {
    #[command(subcommand)]
    pub command: ClipCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClipCommand {
    /// Flush the replay buffer to a new clip
    Save,

    /// List saved clips
    #[command(alias = "ls")]
    List,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
