//! Core Janitor implementation: validates and runs cleanups per dataset

use crate::registry::{ExecutorRegistry, SharedExecutor};
use crate::{CleanupRequest, JanitorConfig, JanitorError, JanitorMetrics};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Instant;
use tidemark_domain::{
    CleanupExecutor, CleanupPolicy, CleanupReport, ExecutionError, RetentionPolicy, SessionFactory,
};
use tidemark_gatekeeper::{PolicyValidator, ValidationResult, ValidationStatus};

/// Where a dataset is in its run cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// No run in progress
    Idle,
    /// Policy snapshot is being checked
    Validating,
    /// Executor is deleting rows
    Executing,
}

/// Why a fire did not execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The policy is switched off
    Disabled,
    /// The policy failed validation on these fields
    Invalid(Vec<String>),
    /// A run for the same dataset has not finished yet
    AlreadyRunning,
}

/// Result of a single fire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The executor ran to completion
    Completed(CleanupReport),
    /// Nothing was executed
    Skipped(SkipReason),
}

struct Dataset<T> {
    policy: Arc<RetentionPolicy>,
    payload: Arc<T>,
}

/// Janitor service running retention cleanups
///
/// Holds the current policy snapshot and payload of every dataset, the
/// executor bound to it, and its run phase. A fire walks
/// `Idle -> Validating -> Executing -> Idle`; a fire that finds its dataset
/// anywhere but `Idle` is skipped, so at most one run per dataset executes
/// at a time. Different datasets run concurrently.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use tidemark_domain::TimeWindowPolicy;
/// use tidemark_gatekeeper::PolicyValidator;
/// use tidemark_janitor::Janitor;
/// use tidemark_store::{SqliteCleaner, SqliteSessionFactory, TableTarget};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let factory = SqliteSessionFactory::new("history.db");
/// let janitor = Janitor::new(factory, PolicyValidator::default_config());
///
/// janitor.register_executor("position_log", Arc::new(SqliteCleaner::new()));
/// janitor.configure(
///     "position_log",
///     TimeWindowPolicy::keep_days("0 0 3 * * ?", 30).into(),
///     TableTarget::new("position_log", "recorded_at"),
/// );
///
/// let outcome = janitor.fire("position_log")?;
/// println!("{:?}", outcome);
/// # Ok(())
/// # }
/// ```
pub struct Janitor<F: SessionFactory, T> {
    session_factory: Arc<F>,
    validator: PolicyValidator,
    executors: ExecutorRegistry<F::Session, T>,
    datasets: RwLock<HashMap<String, Dataset<T>>>,
    phases: Mutex<HashMap<String, RunPhase>>,
    metrics: Mutex<JanitorMetrics>,
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds a dataset out of `Idle`; dropping it returns the dataset to `Idle`
struct PhaseGuard<'a> {
    phases: &'a Mutex<HashMap<String, RunPhase>>,
    dataset: &'a str,
}

impl PhaseGuard<'_> {
    fn set(&self, phase: RunPhase) {
        lock(self.phases).insert(self.dataset.to_string(), phase);
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.set(RunPhase::Idle);
    }
}

impl<F: SessionFactory, T> Janitor<F, T> {
    /// Create a Janitor with no datasets
    pub fn new(session_factory: F, validator: PolicyValidator) -> Self {
        Self {
            session_factory: Arc::new(session_factory),
            validator,
            executors: ExecutorRegistry::new(),
            datasets: RwLock::new(HashMap::new()),
            phases: Mutex::new(HashMap::new()),
            metrics: Mutex::new(JanitorMetrics::new()),
        }
    }

    /// Create a Janitor for every dataset in `config`, all bound to `executor`
    ///
    /// Invalid policies are loaded anyway (and logged); they are skipped at
    /// every fire until a reload fixes them.
    pub fn from_config(
        session_factory: F,
        config: &JanitorConfig<T>,
        executor: SharedExecutor<F::Session, T>,
    ) -> Self
    where
        T: Clone,
    {
        let janitor = Self::new(session_factory, PolicyValidator::new(config.validation.clone()));
        for dataset in &config.datasets {
            janitor.register_executor(dataset.name.clone(), executor.clone());
            janitor.configure(dataset.name.clone(), dataset.policy.clone(), dataset.payload.clone());
        }
        janitor
    }

    /// Validator applied before every run
    pub fn validator(&self) -> &PolicyValidator {
        &self.validator
    }

    /// Bind `executor` to `dataset`
    pub fn register_executor(&self, dataset: impl Into<String>, executor: SharedExecutor<F::Session, T>) {
        self.executors.register(dataset, executor);
    }

    /// Add or replace a dataset's policy and payload
    pub fn configure(&self, dataset: impl Into<String>, policy: RetentionPolicy, payload: T) -> ValidationResult {
        let dataset = dataset.into();
        let result = self.report_validation(&dataset, &policy);

        self.datasets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                dataset,
                Dataset {
                    policy: Arc::new(policy),
                    payload: Arc::new(payload),
                },
            );
        result
    }

    /// Replace a dataset's policy snapshot
    ///
    /// A run already executing keeps the snapshot it started with.
    pub fn reload(&self, dataset: &str, policy: RetentionPolicy) -> Result<ValidationResult, JanitorError> {
        let result = self.report_validation(dataset, &policy);

        let mut datasets = self.datasets.write().unwrap_or_else(PoisonError::into_inner);
        let entry = datasets
            .get_mut(dataset)
            .ok_or_else(|| JanitorError::UnknownDataset(dataset.to_string()))?;
        entry.policy = Arc::new(policy);

        tracing::info!(dataset, status = ?result.status, "Policy reloaded");
        Ok(result)
    }

    fn report_validation(&self, dataset: &str, policy: &RetentionPolicy) -> ValidationResult {
        let result = self.validator.check(policy);
        if result.status == ValidationStatus::Rejected {
            tracing::warn!(
                dataset,
                fields = ?result.fields(),
                "Invalid retention policy; it will not run"
            );
        }
        result
    }

    /// Current policy snapshot of a dataset
    pub fn policy(&self, dataset: &str) -> Option<Arc<RetentionPolicy>> {
        self.datasets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(dataset)
            .map(|entry| entry.policy.clone())
    }

    /// Validate the current policy of a dataset
    pub fn validate(&self, dataset: &str) -> Result<ValidationResult, JanitorError> {
        let policy = self
            .policy(dataset)
            .ok_or_else(|| JanitorError::UnknownDataset(dataset.to_string()))?;
        Ok(self.validator.check(&policy))
    }

    /// Names of all configured datasets, sorted
    pub fn datasets(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .datasets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Run phase of a dataset
    pub fn phase(&self, dataset: &str) -> RunPhase {
        lock(&self.phases).get(dataset).copied().unwrap_or(RunPhase::Idle)
    }

    /// Snapshot of the current metrics
    pub fn metrics(&self) -> JanitorMetrics {
        lock(&self.metrics).clone()
    }

    /// Reset metrics counters
    pub fn reset_metrics(&self) {
        lock(&self.metrics).reset();
    }

    fn snapshot(&self, dataset: &str) -> Result<(Arc<RetentionPolicy>, Arc<T>), JanitorError> {
        self.datasets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(dataset)
            .map(|entry| (entry.policy.clone(), entry.payload.clone()))
            .ok_or_else(|| JanitorError::UnknownDataset(dataset.to_string()))
    }

    fn try_begin<'a>(&'a self, dataset: &'a str) -> Option<PhaseGuard<'a>> {
        let mut phases = lock(&self.phases);
        let phase = phases.entry(dataset.to_string()).or_insert(RunPhase::Idle);
        if *phase != RunPhase::Idle {
            return None;
        }
        *phase = RunPhase::Validating;

        Some(PhaseGuard {
            phases: &self.phases,
            dataset,
        })
    }

    fn skip(&self, dataset: &str, reason: SkipReason) -> RunOutcome {
        lock(&self.metrics).record_skip(dataset);
        RunOutcome::Skipped(reason)
    }

    /// Run one cleanup for `dataset` now
    ///
    /// Blocks for the duration of the run. Returns `Skipped` when the policy
    /// is disabled, invalid, or a run for the dataset is still in progress.
    ///
    /// # Errors
    ///
    /// - [`JanitorError::UnknownDataset`] / [`JanitorError::NoExecutor`] for
    ///   an unbound dataset
    /// - [`JanitorError::Execution`] when opening the session or the executor
    ///   fails; the dataset returns to `Idle` and the next fire starts over
    pub fn fire(&self, dataset: &str) -> Result<RunOutcome, JanitorError> {
        let executor = self
            .executors
            .get(dataset)
            .ok_or_else(|| JanitorError::NoExecutor(dataset.to_string()))?;

        let Some(guard) = self.try_begin(dataset) else {
            tracing::debug!(dataset, "Previous run still in progress, skipping");
            return Ok(self.skip(dataset, SkipReason::AlreadyRunning));
        };

        let (policy, payload) = self.snapshot(dataset)?;

        if !policy.is_enabled() {
            tracing::debug!(dataset, "Policy disabled, skipping");
            return Ok(self.skip(dataset, SkipReason::Disabled));
        }

        let validation = self.validator.check(&policy);
        if !validation.is_runnable() {
            tracing::warn!(dataset, fields = ?validation.fields(), "Invalid policy, skipping");
            return Ok(self.skip(dataset, SkipReason::Invalid(validation.fields().to_vec())));
        }

        let request = CleanupRequest::new(dataset, self.session_factory.clone(), policy, payload);
        guard.set(RunPhase::Executing);
        tracing::debug!(
            dataset,
            run_id = %request.run_id(),
            kind = %request.policy().kind(),
            "Executing cleanup"
        );

        let start = Instant::now();
        let result = Self::execute(&*executor, &request);
        let elapsed = start.elapsed();
        drop(guard);

        match result {
            Ok(report) => {
                lock(&self.metrics).record_run(dataset, &report, elapsed);
                tracing::info!(
                    dataset,
                    run_id = %request.run_id(),
                    rows_deleted = report.rows_deleted,
                    bytes_freed = ?report.bytes_freed,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Cleanup completed"
                );
                Ok(RunOutcome::Completed(report))
            }
            Err(source) => {
                lock(&self.metrics).record_failure(dataset, elapsed);
                tracing::error!(dataset, run_id = %request.run_id(), error = %source, "Cleanup failed");
                Err(JanitorError::Execution {
                    dataset: dataset.to_string(),
                    source,
                })
            }
        }
    }

    /// Fire every configured dataset once, in name order
    pub fn fire_all(&self) -> Vec<(String, Result<RunOutcome, JanitorError>)> {
        self.datasets()
            .into_iter()
            .map(|dataset| {
                let outcome = self.fire(&dataset);
                (dataset, outcome)
            })
            .collect()
    }

    /// One session per run, dropped on every exit path
    fn execute(
        executor: &dyn CleanupExecutor<F::Session, T>,
        request: &CleanupRequest<F, T>,
    ) -> Result<CleanupReport, ExecutionError> {
        let mut session = request
            .open_session()
            .map_err(|e| ExecutionError::data_access("open session", e))?;

        executor.exec(&mut session, request.policy(), request.payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use tidemark_domain::{QuotaPolicy, TimeWindowPolicy};

    #[derive(Default)]
    struct Counters {
        opened: AtomicUsize,
        closed: AtomicUsize,
    }

    struct MockSession(Arc<Counters>);

    impl Drop for MockSession {
        fn drop(&mut self) {
            self.0.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct MockFactory {
        counters: Arc<Counters>,
        fail: bool,
    }

    impl SessionFactory for MockFactory {
        type Session = MockSession;
        type Error = std::io::Error;

        fn open(&self) -> Result<MockSession, std::io::Error> {
            if self.fail {
                return Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "down"));
            }
            self.counters.opened.fetch_add(1, Ordering::SeqCst);
            Ok(MockSession(self.counters.clone()))
        }
    }

    /// Deletes a fixed number of rows and remembers what it was given
    #[derive(Default)]
    struct RecordingExecutor {
        calls: Mutex<Vec<(RetentionPolicy, String)>>,
    }

    impl CleanupExecutor<MockSession, String> for RecordingExecutor {
        fn exec(
            &self,
            _session: &mut MockSession,
            policy: &RetentionPolicy,
            payload: &String,
        ) -> Result<CleanupReport, ExecutionError> {
            lock(&self.calls).push((policy.clone(), payload.clone()));
            Ok(CleanupReport {
                rows_deleted: 3,
                ..CleanupReport::nothing()
            })
        }
    }

    struct FailingExecutor;

    impl CleanupExecutor<MockSession, String> for FailingExecutor {
        fn exec(&self, _: &mut MockSession, _: &RetentionPolicy, _: &String) -> Result<CleanupReport, ExecutionError> {
            Err(ExecutionError::data_access(
                "delete",
                std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            ))
        }
    }

    /// Blocks inside exec until released
    struct GatedExecutor {
        started: Mutex<mpsc::Sender<RetentionPolicy>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl CleanupExecutor<MockSession, String> for GatedExecutor {
        fn exec(&self, _: &mut MockSession, policy: &RetentionPolicy, _: &String) -> Result<CleanupReport, ExecutionError> {
            let _ = lock(&self.started).send(policy.clone());
            let _ = lock(&self.release).recv();
            Ok(CleanupReport::nothing())
        }
    }

    fn janitor(fail_open: bool) -> (Janitor<MockFactory, String>, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let factory = MockFactory {
            counters: counters.clone(),
            fail: fail_open,
        };
        (Janitor::new(factory, PolicyValidator::default_config()), counters)
    }

    fn daily(days: i32) -> RetentionPolicy {
        TimeWindowPolicy::keep_days("0 0 3 * * ?", days).into()
    }

    #[test]
    fn test_fire_runs_executor() {
        let (janitor, counters) = janitor(false);
        let executor = Arc::new(RecordingExecutor::default());
        janitor.register_executor("log", executor.clone());
        janitor.configure("log", daily(30), "position_log".to_string());

        let outcome = janitor.fire("log").unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Completed(CleanupReport {
                rows_deleted: 3,
                ..CleanupReport::nothing()
            })
        );
        assert_eq!(lock(&executor.calls).as_slice(), [(daily(30), "position_log".to_string())]);
        assert_eq!(counters.opened.load(Ordering::SeqCst), 1);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
        assert_eq!(janitor.phase("log"), RunPhase::Idle);
        assert_eq!(janitor.metrics().dataset("log").unwrap().rows_deleted, 3);
    }

    #[test]
    fn test_disabled_policy_skipped() {
        let (janitor, counters) = janitor(false);
        let executor = Arc::new(RecordingExecutor::default());
        janitor.register_executor("log", executor.clone());
        janitor.configure("log", TimeWindowPolicy::disabled().into(), String::new());

        assert_eq!(janitor.fire("log").unwrap(), RunOutcome::Skipped(SkipReason::Disabled));
        assert!(lock(&executor.calls).is_empty());
        assert_eq!(counters.opened.load(Ordering::SeqCst), 0);
        assert_eq!(janitor.metrics().total_skipped(), 1);
    }

    #[test]
    fn test_invalid_policy_skipped() {
        let (janitor, _) = janitor(false);
        let executor = Arc::new(RecordingExecutor::default());
        janitor.register_executor("log", executor.clone());

        let result = janitor.configure("log", QuotaPolicy::new("", 0, 1).into(), String::new());
        assert_eq!(result.status, ValidationStatus::Rejected);

        let outcome = janitor.fire("log").unwrap();
        assert_eq!(
            outcome,
            RunOutcome::Skipped(SkipReason::Invalid(vec!["cron".to_string(), "quotaM".to_string()]))
        );
        assert!(lock(&executor.calls).is_empty());
        assert_eq!(janitor.phase("log"), RunPhase::Idle);
    }

    #[test]
    fn test_unknown_dataset_and_missing_executor() {
        let (janitor, _) = janitor(false);
        assert!(matches!(janitor.fire("nope"), Err(JanitorError::NoExecutor(_))));

        janitor.register_executor("orphan", Arc::new(RecordingExecutor::default()));
        assert!(matches!(janitor.fire("orphan"), Err(JanitorError::UnknownDataset(_))));
        assert_eq!(janitor.phase("orphan"), RunPhase::Idle);

        janitor.configure("unbound", daily(1), String::new());
        assert!(matches!(janitor.fire("unbound"), Err(JanitorError::NoExecutor(name)) if name == "unbound"));
    }

    #[test]
    fn test_execution_failure_returns_to_idle() {
        let (janitor, counters) = janitor(false);
        janitor.register_executor("log", Arc::new(FailingExecutor));
        janitor.configure("log", daily(30), String::new());

        let err = janitor.fire("log").unwrap_err();
        match err {
            JanitorError::Execution { dataset, source } => {
                assert_eq!(dataset, "log");
                assert!(matches!(source, ExecutionError::DataAccess { .. }));
            }
            other => panic!("Expected Execution error, got {:?}", other),
        }

        assert_eq!(janitor.phase("log"), RunPhase::Idle);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1, "Session released after failure");
        assert_eq!(janitor.metrics().total_failures(), 1);

        // Next fire starts over
        janitor.register_executor("log", Arc::new(RecordingExecutor::default()));
        assert!(matches!(janitor.fire("log"), Ok(RunOutcome::Completed(_))));
    }

    #[test]
    fn test_session_open_failure() {
        let (janitor, _) = janitor(true);
        janitor.register_executor("log", Arc::new(RecordingExecutor::default()));
        janitor.configure("log", daily(30), String::new());

        let err = janitor.fire("log").unwrap_err();
        assert!(matches!(
            err,
            JanitorError::Execution {
                source: ExecutionError::DataAccess { .. },
                ..
            }
        ));
        assert_eq!(janitor.phase("log"), RunPhase::Idle);
    }

    #[test]
    fn test_overlapping_fire_skipped() {
        let (janitor, _) = janitor(false);
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        janitor.register_executor(
            "log",
            Arc::new(GatedExecutor {
                started: Mutex::new(started_tx),
                release: Mutex::new(release_rx),
            }),
        );
        janitor.register_executor("other", Arc::new(RecordingExecutor::default()));
        janitor.configure("log", daily(30), String::new());
        janitor.configure("other", daily(30), String::new());

        let janitor = Arc::new(janitor);
        let running = {
            let janitor = janitor.clone();
            std::thread::spawn(move || janitor.fire("log"))
        };

        let seen = started_rx.recv().unwrap();
        assert_eq!(janitor.phase("log"), RunPhase::Executing);

        // Same dataset is locked out, another dataset is not
        assert_eq!(janitor.fire("log").unwrap(), RunOutcome::Skipped(SkipReason::AlreadyRunning));
        assert!(matches!(janitor.fire("other"), Ok(RunOutcome::Completed(_))));

        // Reload mid-run does not touch the running snapshot
        janitor.reload("log", daily(7)).unwrap();
        release_tx.send(()).unwrap();

        assert!(matches!(running.join().unwrap(), Ok(RunOutcome::Completed(_))));
        assert_eq!(seen, daily(30));
        assert_eq!(janitor.phase("log"), RunPhase::Idle);
        assert_eq!(*janitor.policy("log").unwrap(), daily(7));
    }

    #[test]
    fn test_reload_replaces_snapshot() {
        let (janitor, _) = janitor(false);
        janitor.configure("log", daily(30), String::new());
        let before = janitor.policy("log").unwrap();

        let result = janitor.reload("log", TimeWindowPolicy::disabled().into()).unwrap();
        assert_eq!(result.status, ValidationStatus::Disabled);

        let after = janitor.policy("log").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(*before, daily(30));

        assert!(matches!(
            janitor.reload("missing", daily(1)),
            Err(JanitorError::UnknownDataset(_))
        ));
    }

    #[test]
    fn test_fire_all_in_name_order() {
        let (janitor, _) = janitor(false);
        let executor: SharedExecutor<MockSession, String> = Arc::new(RecordingExecutor::default());
        for name in ["b", "a", "c"] {
            janitor.register_executor(name, executor.clone());
            janitor.configure(name, daily(1), name.to_string());
        }

        let names: Vec<String> = janitor.fire_all().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(janitor.metrics().total_runs(), 3);
    }

    #[test]
    fn test_from_config() {
        let config: JanitorConfig<std::collections::HashMap<String, String>> = JanitorConfig::from_toml_str(
            r#"
            database_url = "jdbc:sqlite:history.db"

            [[datasets]]
            name = "position_log"
            [datasets.policy]
            kind = "time_window"
            enabled = true
            cron = "0 0 3 * * ?"
            keep_days = 30

            [[datasets]]
            name = "alarm_log"
            [datasets.policy]
            kind = "quota"
            enabled = true
            cron = "not a cron"
            quota_m = 10
            delete_m = 1
            "#,
        )
        .unwrap();

        struct Nop;
        impl CleanupExecutor<MockSession, std::collections::HashMap<String, String>> for Nop {
            fn exec(
                &self,
                _: &mut MockSession,
                _: &RetentionPolicy,
                _: &std::collections::HashMap<String, String>,
            ) -> Result<CleanupReport, ExecutionError> {
                Ok(CleanupReport::nothing())
            }
        }

        let factory = MockFactory {
            counters: Arc::new(Counters::default()),
            fail: false,
        };
        let janitor = Janitor::from_config(factory, &config, Arc::new(Nop));

        assert_eq!(janitor.datasets(), ["alarm_log", "position_log"]);
        assert!(janitor.validate("position_log").unwrap().is_runnable());
        assert_eq!(janitor.validate("alarm_log").unwrap().fields(), ["cron"]);
        assert!(matches!(janitor.fire("position_log"), Ok(RunOutcome::Completed(_))));
        assert!(matches!(
            janitor.fire("alarm_log"),
            Ok(RunOutcome::Skipped(SkipReason::Invalid(_)))
        ));
    }
}
