//! Error types shared by policies and executors

use thiserror::Error;

/// Boxed error used to carry an underlying data-access cause
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A policy is enabled but structurally incomplete
///
/// Not retried; an operator has to fix the configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither a day count nor a minute count was supplied
    #[error("Missing retention: neither keepDays nor keepMinutes is set")]
    MissingRetention,

    /// The authoritative retention count is negative
    #[error("Negative retention: {field} = {value}")]
    NegativeRetention {
        /// Field name as it appears in configuration
        field: &'static str,
        /// Offending value
        value: i64,
    },
}

/// Failure while carrying out a deletion
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// Connectivity, constraint, timeout or interrupt failure from the session
    #[error("Data access failed during {operation}: {source}")]
    DataAccess {
        /// What the executor was doing
        operation: String,
        /// Underlying cause
        #[source]
        source: BoxError,
    },

    /// The payload names a table or column that cannot be used
    #[error("Invalid cleanup target: {0}")]
    InvalidTarget(String),

    /// Occupied size can neither be measured nor estimated
    #[error("Cannot measure occupied size of {0}: no size column and no avgItemSize")]
    Unmeasurable(String),

    /// The executor does not handle this policy kind
    #[error("Executor does not support {0} policies")]
    UnsupportedPolicy(&'static str),

    /// The policy turned out to be incomplete at execution time
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ExecutionError {
    /// Wrap a session error with the operation that triggered it
    pub fn data_access<E>(operation: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        ExecutionError::DataAccess {
            operation: operation.into(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_data_access_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "session aborted");
        let err = ExecutionError::data_access("delete batch", io);

        assert!(err.to_string().contains("delete batch"));
        assert!(err.source().unwrap().to_string().contains("session aborted"));
    }

    #[test]
    fn test_config_error_converts() {
        let err: ExecutionError = ConfigError::MissingRetention.into();
        assert!(matches!(err, ExecutionError::Config(ConfigError::MissingRetention)));
    }
}
