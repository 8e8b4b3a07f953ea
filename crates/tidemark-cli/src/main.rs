//! Tidemark CLI - Retention cleanup for historical data tables.

use clap::Parser;
use std::path::PathBuf;
use tidemark_cli::commands;
use tidemark_cli::config;
use tidemark_cli::output::OutputFormat;
use tidemark_cli::{AppConfig, Cli, Command, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing (log to stderr, RUST_LOG overrides)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> tidemark_cli::Result<()> {
    let cli = Cli::parse();

    let format = cli.format.map(Into::into).unwrap_or(OutputFormat::Table);
    let formatter = Formatter::new(format, !cli.no_color);

    match cli.command {
        Command::Dialect(args) => commands::execute_dialect(args, &formatter)?,
        Command::Check => commands::execute_check(&load_config(cli.config)?, &formatter)?,
        Command::RunOnce(args) => commands::execute_run_once(args, &load_config(cli.config)?, &formatter)?,
        Command::Daemon => commands::execute_daemon(&load_config(cli.config)?, &formatter).await?,
    }

    Ok(())
}

fn load_config(explicit: Option<PathBuf>) -> tidemark_cli::Result<AppConfig> {
    let path = config::resolve_path(explicit)?;
    let app_config = config::load(&path)?;
    tracing::debug!(path = %path.display(), datasets = app_config.datasets.len(), "Loaded configuration");
    Ok(app_config)
}
