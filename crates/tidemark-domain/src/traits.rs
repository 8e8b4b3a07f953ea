//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the policy model and
//! infrastructure. Implementations live in other crates.

use crate::{BoxError, ExecutionError, RetentionPolicy};

/// Receives field-level validation violations
///
/// Called zero or more times per validation; any call means the policy
/// must not be scheduled.
pub trait ValidationSink {
    /// Report that `field` holds an invalid value
    fn invalid_field(&mut self, field: &str);
}

impl ValidationSink for Vec<String> {
    fn invalid_field(&mut self, field: &str) {
        self.push(field.to_string());
    }
}

/// Opens database sessions
///
/// Implemented by the infrastructure layer (tidemark-store). One session is
/// opened per cleanup run and dropped when the run ends, whatever the outcome.
pub trait SessionFactory: Send + Sync {
    /// Open session type
    type Session;

    /// Error type for opening a session
    type Error: Into<BoxError>;

    /// Open a new session
    fn open(&self) -> Result<Self::Session, Self::Error>;
}

/// What a cleanup run deleted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Rows removed by the run
    pub rows_deleted: u64,

    /// Bytes freed, when the executor can tell
    pub bytes_freed: Option<u64>,

    /// Measured or estimated occupancy before the run (quota policies)
    pub occupied_before: Option<u64>,
}

impl CleanupReport {
    /// Report for a run that deleted nothing
    pub fn nothing() -> Self {
        Self::default()
    }
}

/// Carries out the deletion a policy calls for
///
/// Implemented per dialect by the infrastructure layer. `T` is the opaque,
/// executor-defined payload (a table name, tenant id, partition keys...).
///
/// Preconditions: the caller validated `policy` and confirmed it is enabled.
/// The executor does not re-validate. It is invoked by at most one thread at
/// a time per dataset.
pub trait CleanupExecutor<S, T>: Send + Sync {
    /// Delete whatever `policy` makes eligible in the dataset described by `payload`
    ///
    /// # Errors
    ///
    /// Any session failure is returned as [`ExecutionError::DataAccess`].
    /// Batches completed before the failure stay committed.
    fn exec(
        &self,
        session: &mut S,
        policy: &RetentionPolicy,
        payload: &T,
    ) -> Result<CleanupReport, ExecutionError>;
}
