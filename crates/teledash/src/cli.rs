//! Clap derive structures for the `teledash` CLI.
//!
//! Defines the command tree, global flags, and shared value types.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// teledash -- settings and live telemetry for a racing telemetry bridge
#[derive(Debug, Parser)]
#[command(
    name = "teledash",
    version,
    about = "Configure and watch a racing telemetry bridge from the command line",
    long_about = "Edits a racing telemetry bridge's stored settings (app config, OSC\n\
        addresses, packet forwarding, telemetry fields), restarts its services,\n\
        and follows the live telemetry stream.",
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
    /// Bridge profile to use
    #[arg(long, short = 'p', env = "TELEDASH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Bridge base URL (overrides profile)
    #[arg(long, short = 'b', env = "TELEDASH_BRIDGE", global = true)]
    pub bridge: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TELEDASH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, env = "TELEDASH_COLOR", default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (default: none)
    #[arg(long, env = "TELEDASH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
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

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// On/off switch for boolean settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

/// Bridge service that can be restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServiceArg {
    /// UDP telemetry listener
    Udp,
    /// OSC sender
    Osc,
    /// Both services
    All,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// View and edit the bridge's app config
    #[command(alias = "s")]
    Settings(SettingsArgs),

    /// Manage OSC address forwarding
    Osc(OscArgs),

    /// Manage which game packets are forwarded
    #[command(alias = "pk")]
    Packets(PacketsArgs),

    /// Manage which telemetry fields are published
    Fields(FieldsArgs),

    /// Restart a bridge service
    Restart(RestartArgs),

    /// Follow the live telemetry stream
    Live(LiveArgs),

    /// Show bridge and client versions
    Version,

    /// Show or toggle the color theme
    Theme(ThemeArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Settings ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show the app config
    Show,

    /// Set one or more fields and save once
    ///
    /// Fields: udp_addr, udp_port, osc_addr, osc_port, enable_osc,
    /// broadcast_rate_hz, debug_output
    Set {
        /// FIELD=VALUE pairs
        #[arg(required = true, value_name = "FIELD=VALUE")]
        assignments: Vec<String>,
    },

    /// Replace the app config with the contents of a JSON file
    Import {
        /// Path to a JSON document
        #[arg(long = "from-file", short = 'F')]
        from_file: PathBuf,
    },
}

// ── OSC ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct OscArgs {
    #[command(subcommand)]
    pub command: OscCommand,
}

#[derive(Debug, Subcommand)]
pub enum OscCommand {
    /// List every OSC address
    #[command(alias = "ls")]
    List,

    /// Show addresses grouped by path prefix
    Groups,

    /// Flip one address on or off (saves immediately)
    Toggle {
        /// Address key (e.g., "Speed")
        key: String,
    },

    /// Flip whether zero values are forwarded for one address
    AllowZero {
        /// Address key
        key: String,
    },

    /// Turn every address in a group on or off with a single save
    Group {
        /// Group key (e.g., "car", or "Other")
        group: String,

        /// Target state
        #[arg(value_enum)]
        state: Switch,
    },
}

// ── Packets ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PacketsArgs {
    #[command(subcommand)]
    pub command: PacketsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PacketsCommand {
    /// List packet ids with their forwarding state
    #[command(alias = "ls")]
    List,

    /// Flip one or more packet ids, then save once
    Toggle {
        /// Packet ids (e.g., 0 6)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Set one packet id on or off, then save
    Set {
        /// Packet id
        id: String,

        /// Target state
        #[arg(value_enum)]
        state: Switch,
    },
}

// ── Fields ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FieldsArgs {
    #[command(subcommand)]
    pub command: FieldsCommand,
}

#[derive(Debug, Subcommand)]
pub enum FieldsCommand {
    /// List telemetry fields with their published state
    #[command(alias = "ls")]
    List,

    /// Flip one or more fields, then save once
    Toggle {
        /// Field names (e.g., Speed RPM)
        #[arg(required = true)]
        fields: Vec<String>,
    },
}

// ── Restart ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RestartArgs {
    /// Service to restart
    #[arg(value_enum)]
    pub service: ServiceArg,
}

// ── Live ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LiveArgs {
    /// Stop after this many snapshots (at least 1)
    #[arg(long, short = 'n', value_parser = clap::value_parser!(u64).range(1..))]
    pub count: Option<u64>,

    /// Stop after this long (e.g., "30s", "2m")
    #[arg(long, short = 'd', value_parser = humantime::parse_duration)]
    pub duration: Option<Duration>,

    /// Reconnect with backoff when the stream drops
    #[arg(long)]
    pub reconnect: bool,
}

// ── Theme ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ThemeArgs {
    #[command(subcommand)]
    pub command: Option<ThemeCommand>,
}

#[derive(Debug, Subcommand)]
pub enum ThemeCommand {
    /// Print the current theme
    Show,

    /// Switch between dark and light and remember the choice
    Toggle,
}

// ── Config ───────────────────────────────────────────────────────────

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

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
