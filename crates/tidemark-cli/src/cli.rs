//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tidemark - Retention cleanup for historical data tables.
#[derive(Debug, Parser)]
#[command(name = "tidemark")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.tidemark/config.toml)
    #[arg(short, long, global = true, env = "TIDEMARK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate every configured policy
    Check,

    /// Run cleanups once and exit
    RunOnce(RunOnceArgs),

    /// Run cleanups on their cron schedules until Ctrl+C
    Daemon,

    /// Print the SQL dialect of a connection URL
    Dialect(DialectArgs),
}

/// Arguments for the run-once command.
#[derive(Debug, Parser)]
pub struct RunOnceArgs {
    /// Only clean this dataset
    #[arg(short, long)]
    pub dataset: Option<String>,
}

/// Arguments for the dialect command.
#[derive(Debug, Parser)]
pub struct DialectArgs {
    /// Connection URL (e.g., jdbc:postgresql://db:5432/history)
    pub url: String,
}
