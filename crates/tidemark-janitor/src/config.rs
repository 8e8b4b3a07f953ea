//! Configuration for Janitor operations
//!
//! Binds datasets to retention policies and executor payloads.

use crate::ConfigFileError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tidemark_domain::RetentionPolicy;
use tidemark_gatekeeper::ValidationConfig;

/// Configuration for the Janitor service
///
/// `T` is the executor payload, flattened into each `[[datasets]]` table.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use tidemark_janitor::JanitorConfig;
///
/// let config: JanitorConfig<HashMap<String, String>> = JanitorConfig::from_toml_str(r#"
///     database_url = "jdbc:sqlite:history.db"
///
///     [[datasets]]
///     name = "position_log"
///     table = "position_log"
///
///     [datasets.policy]
///     kind = "time_window"
///     cron = "0 0 3 * * ?"
///     keep_days = 30
/// "#).unwrap();
///
/// assert_eq!(config.datasets.len(), 1);
/// assert_eq!(config.datasets[0].payload["table"], "position_log");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JanitorConfig<T> {
    /// Connection URL of the history database (`jdbc:<dialect>:...`)
    pub database_url: String,

    /// Validation rules applied before every run
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Background worker settings
    #[serde(default)]
    pub worker: WorkerConfig,

    /// Datasets under retention management
    #[serde(default = "Vec::new")]
    pub datasets: Vec<DatasetConfig<T>>,
}

/// One dataset and the policy that governs it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig<T> {
    /// Unique dataset name, used as the executor binding and lock key
    pub name: String,

    /// Retention policy
    pub policy: RetentionPolicy,

    /// Executor-defined payload
    #[serde(flatten)]
    pub payload: T,
}

/// Background worker settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// How often a disabled or unschedulable dataset re-reads its policy (in seconds)
    /// Default: 60
    #[serde(default = "default_idle_poll_secs")]
    pub idle_poll_secs: u64,
}

fn default_idle_poll_secs() -> u64 {
    60
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            idle_poll_secs: default_idle_poll_secs(),
        }
    }
}

impl WorkerConfig {
    /// Get the idle poll interval as Duration
    pub fn idle_poll(&self) -> Duration {
        Duration::from_secs(self.idle_poll_secs.max(1))
    }
}

impl<T: DeserializeOwned> JanitorConfig<T> {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigFileError> {
        let config: Self = toml::from_str(contents)?;
        config.check_names()?;
        Ok(config)
    }
}

impl<T> JanitorConfig<T> {
    /// Look up a dataset by name
    pub fn dataset(&self, name: &str) -> Option<&DatasetConfig<T>> {
        self.datasets.iter().find(|dataset| dataset.name == name)
    }

    fn check_names(&self) -> Result<(), ConfigFileError> {
        let mut seen = HashSet::new();
        for dataset in &self.datasets {
            if dataset.name.trim().is_empty() {
                return Err(ConfigFileError::EmptyDatasetName);
            }
            if !seen.insert(dataset.name.as_str()) {
                return Err(ConfigFileError::DuplicateDataset(dataset.name.clone()));
            }
        }
        Ok(())
    }
}
