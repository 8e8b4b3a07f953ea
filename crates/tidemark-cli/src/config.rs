//! Configuration loading for the CLI.

use crate::error::{CliError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tidemark_janitor::{Janitor, JanitorConfig};
use tidemark_store::{SqliteCleaner, SqliteSessionFactory, TableTarget};

/// Configuration file layout: datasets are SQLite tables.
pub type AppConfig = JanitorConfig<TableTarget>;

/// Janitor cleaning SQLite tables.
pub type SqliteJanitor = Janitor<SqliteSessionFactory, TableTarget>;

/// Get the default configuration file path.
pub fn default_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    Ok(home.join(".tidemark").join("config.toml"))
}

/// Resolve the configuration file path, preferring an explicit one.
pub fn resolve_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => default_path(),
    }
}

/// Load configuration from file.
pub fn load(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Err(CliError::Config(format!(
            "Config file {} not found",
            path.display()
        )));
    }
    Ok(AppConfig::from_file(path)?)
}

/// Build a janitor over the configured database, one SQLite cleaner for all datasets.
pub fn build_janitor(config: &AppConfig) -> Result<SqliteJanitor> {
    let factory = SqliteSessionFactory::from_url(&config.database_url)?;
    Ok(Janitor::from_config(factory, config, Arc::new(SqliteCleaner::new())))
}
