//! Error types for Janitor operations

use std::path::PathBuf;
use thiserror::Error;
use tidemark_domain::ExecutionError;

/// Errors that can occur during Janitor operations
#[derive(Error, Debug)]
pub enum JanitorError {
    /// The executor failed; batches completed before the failure stay deleted
    #[error("Cleanup of dataset '{dataset}' failed: {source}")]
    Execution {
        /// Dataset the run belonged to
        dataset: String,
        /// Underlying executor failure
        #[source]
        source: ExecutionError,
    },

    /// No policy is configured for the dataset
    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),

    /// No executor is registered for the dataset
    #[error("No executor registered for dataset: {0}")]
    NoExecutor(String),

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}

/// Errors loading a janitor configuration file
#[derive(Error, Debug)]
pub enum ConfigFileError {
    /// The file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for the expected layout
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Two datasets share a name
    #[error("Duplicate dataset name: {0}")]
    DuplicateDataset(String),

    /// A dataset has an empty name
    #[error("Dataset name must not be empty")]
    EmptyDatasetName,
}
