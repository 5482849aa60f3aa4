//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Helmet Watch - live helmet compliance monitor for a worker fleet
#[derive(Parser, Debug)]
#[command(
    name = "helmet-watch",
    author,
    version,
    about = "Live helmet compliance monitor",
    long_about = "Polls every worker's helmet sensor on a fixed period, aggregates the\n\
                  fleet's compliance and danger rate, and publishes each snapshot to\n\
                  the configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "HELMET_WATCH_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "HELMET_WATCH_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the monitor
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "helmet-watch.toml",
        env = "HELMET_WATCH_CONFIG"
    )]
    pub config: PathBuf,

    /// Override the refresh period in milliseconds
    #[arg(long, env = "HELMET_WATCH_TICK_MS")]
    pub tick_ms: Option<u64>,

    /// Override the simulator seed
    #[arg(long, env = "HELMET_WATCH_SEED")]
    pub seed: Option<u64>,

    /// Maximum number of refreshes (0 = unlimited)
    #[arg(long, default_value = "0", env = "HELMET_WATCH_MAX_TICKS")]
    pub max_ticks: u64,

    /// Run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "HELMET_WATCH_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Render the status board on stdout after every refresh
    #[arg(long)]
    pub board: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "HELMET_WATCH_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "helmet-watch.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "helmet-watch.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// List every worker on the roster
    #[arg(long)]
    pub workers: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
