//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be loaded
    #[error(transparent)]
    ConfigFile(#[from] tidemark_janitor::ConfigFileError),

    /// Database setup error
    #[error("Database error: {0}")]
    Store(#[from] tidemark_store::StoreError),

    /// Janitor error
    #[error(transparent)]
    Janitor(#[from] tidemark_janitor::JanitorError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Some policies failed validation
    #[error("{0} invalid policy(ies)")]
    InvalidPolicies(usize),

    /// Some cleanup runs failed
    #[error("{0} cleanup run(s) failed")]
    RunsFailed(usize),
}
