//! Clap derive structures for the `wellbeing` CLI.
//!
//! Defines the command tree, global flags and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wellbeing -- bridge Electrolux/AEG Wellbeing air purifiers
#[derive(Debug, Parser)]
#[command(
    name = "wellbeing",
    version,
    about = "Monitor and control Wellbeing air purifiers from the command line",
    long_about = "Polls Electrolux/AEG Wellbeing air purifiers and projects their state\n\
        onto accessory characteristics (air purifier, air quality, temperature,\n\
        humidity, CO2, light and filter door sensors).",
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
    /// Wellbeing account e-mail (overrides config)
    #[arg(long, short = 'u', env = "WELLBEING_USERNAME", global = true)]
    pub username: Option<String>,

    /// Poll interval in seconds, minimum 5 (overrides config)
    #[arg(long, env = "WELLBEING_POLL_TIME", global = true)]
    pub poll_time: Option<u64>,

    /// Request timeout in seconds (overrides config)
    #[arg(long, env = "WELLBEING_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "WELLBEING_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the bridge: discover appliances and poll until interrupted
    Run,

    /// List appliances on the account
    #[command(alias = "ls")]
    Appliances,

    /// Show projected accessory state
    #[command(alias = "st")]
    Status(StatusArgs),

    /// Send commands to an appliance
    Set(SetArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Status ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Appliance pnc id (all appliances when omitted)
    pub pnc_id: Option<String>,
}

// ── Set ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
#[command(group(
    clap::ArgGroup::new("change")
        .required(true)
        .multiple(true)
        .args(["mode", "fan_speed", "lock", "ionizer"])
))]
pub struct SetArgs {
    /// Appliance pnc id
    pub pnc_id: String,

    /// Work mode
    #[arg(long)]
    pub mode: Option<ModeArg>,

    /// Fan speed level (1-9)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub fan_speed: Option<u8>,

    /// Child lock on the physical controls
    #[arg(long)]
    pub lock: Option<Toggle>,

    /// Ionizer
    #[arg(long)]
    pub ionizer: Option<Toggle>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Off,
    Auto,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file for a Wellbeing account
    Init {
        /// Account e-mail
        #[arg(long)]
        username: String,

        /// Poll interval in seconds
        #[arg(long)]
        poll_time: Option<u64>,

        /// Save the password in the config file instead of the keyring
        #[arg(long)]
        plaintext: bool,
    },

    /// Show the effective configuration (password redacted)
    Show,

    /// Print the config file path
    Path,

    /// Store the account password
    SetPassword {
        /// Save the password in the config file instead of the keyring
        #[arg(long)]
        plaintext: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}
