//! Executor registry - binds datasets to cleanup executors

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tidemark_domain::CleanupExecutor;

/// Shared executor handle
pub type SharedExecutor<S, T> = Arc<dyn CleanupExecutor<S, T>>;

/// Process-wide map from dataset name to executor
///
/// Populated at start-up and kept for the process lifetime.
pub struct ExecutorRegistry<S, T> {
    executors: RwLock<HashMap<String, SharedExecutor<S, T>>>,
}

impl<S, T> Default for ExecutorRegistry<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, T> ExecutorRegistry<S, T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            executors: RwLock::new(HashMap::new()),
        }
    }

    /// Register the executor for `dataset`, replacing any previous one
    pub fn register(&self, dataset: impl Into<String>, executor: SharedExecutor<S, T>) {
        let dataset = dataset.into();
        tracing::debug!(dataset = %dataset, "Registered cleanup executor");
        self.executors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(dataset, executor);
    }

    /// Executor bound to `dataset`
    pub fn get(&self, dataset: &str) -> Option<SharedExecutor<S, T>> {
        self.executors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(dataset)
            .cloned()
    }

    /// Whether `dataset` has an executor
    pub fn contains(&self, dataset: &str) -> bool {
        self.executors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(dataset)
    }

    /// Number of registered executors
    pub fn len(&self) -> usize {
        self.executors.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no executor is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
