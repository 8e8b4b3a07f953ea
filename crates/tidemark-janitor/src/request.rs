//! Cleanup request - one unit of cleanup work

use std::sync::Arc;
use tidemark_domain::{RetentionPolicy, SessionFactory};
use uuid::Uuid;

/// Everything a single cleanup run needs
///
/// Built fresh for every run and dropped when the run ends. The policy is a
/// snapshot: a reload while the run is executing does not affect it.
pub struct CleanupRequest<F, T> {
    run_id: Uuid,
    dataset: String,
    session_factory: Arc<F>,
    policy: Arc<RetentionPolicy>,
    payload: Arc<T>,
}

impl<F: SessionFactory, T> CleanupRequest<F, T> {
    /// Bind a policy snapshot, a session factory and a payload
    pub fn new(
        dataset: impl Into<String>,
        session_factory: Arc<F>,
        policy: Arc<RetentionPolicy>,
        payload: Arc<T>,
    ) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            dataset: dataset.into(),
            session_factory,
            policy,
            payload,
        }
    }

    /// Identifier correlating the run's log lines
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Dataset the run cleans
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Factory the run opens its session from
    pub fn session_factory(&self) -> &F {
        &self.session_factory
    }

    /// Policy snapshot
    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Executor payload
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Open the run's session
    pub fn open_session(&self) -> Result<F::Session, F::Error> {
        self.session_factory.open()
    }
}

impl<F, T> std::fmt::Debug for CleanupRequest<F, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanupRequest")
            .field("run_id", &self.run_id)
            .field("dataset", &self.dataset)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
