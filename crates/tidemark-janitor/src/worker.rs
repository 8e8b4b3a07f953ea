//! Background worker for continuous Janitor operation

use crate::{Janitor, JanitorError, JanitorMetrics, RunOutcome, WorkerConfig};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tidemark_domain::{CleanupPolicy, SessionFactory};
use tidemark_gatekeeper::ScheduleParser;
use tokio::task::JoinSet;
use tokio::time::Duration;

/// Background worker that fires every dataset on its cron schedule
///
/// One task per dataset computes the next fire time from the dataset's
/// current policy, sleeps until then and runs the cleanup on the blocking
/// pool. Policies are re-read before every fire, so a reload takes effect
/// at the next trigger. A disabled or unschedulable dataset is re-checked
/// every `idle_poll` interval, and datasets configured on the janitor after
/// the worker started are picked up on the same interval.
///
/// Each matching cron instant fires at most once, even when the wall clock
/// lags the timer the task slept on.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use tidemark_gatekeeper::PolicyValidator;
/// use tidemark_janitor::{Janitor, JanitorWorker, WorkerConfig};
/// use tidemark_store::{SqliteSessionFactory, TableTarget};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let factory = SqliteSessionFactory::new("history.db");
///     let janitor: Janitor<_, TableTarget> = Janitor::new(factory, PolicyValidator::default_config());
///     let worker = JanitorWorker::new(Arc::new(janitor), &WorkerConfig::default());
///
///     // Run indefinitely (until Ctrl+C)
///     worker.run().await?;
///     Ok(())
/// }
/// ```
pub struct JanitorWorker<F: SessionFactory, T> {
    janitor: Arc<Janitor<F, T>>,
    idle_poll: Duration,
}

impl<F, T> JanitorWorker<F, T>
where
    F: SessionFactory + 'static,
    T: Send + Sync + 'static,
{
    /// Create a worker driving `janitor`
    pub fn new(janitor: Arc<Janitor<F, T>>, config: &WorkerConfig) -> Self {
        Self {
            janitor,
            idle_poll: config.idle_poll(),
        }
    }

    /// Override the idle poll interval
    pub fn with_idle_poll(mut self, idle_poll: Duration) -> Self {
        self.idle_poll = idle_poll;
        self
    }

    /// The janitor this worker drives
    pub fn janitor(&self) -> &Arc<Janitor<F, T>> {
        &self.janitor
    }

    /// Get a snapshot of the janitor's current metrics
    pub fn metrics(&self) -> JanitorMetrics {
        self.janitor.metrics()
    }

    /// Run the worker until a shutdown signal (Ctrl+C) is received
    ///
    /// # Errors
    ///
    /// Returns an error if a dataset task panicked.
    pub async fn run(&self) -> Result<(), JanitorError> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await
    }

    /// Run the worker until `shutdown` completes
    ///
    /// Runs already handed to the blocking pool finish on their own; no new
    /// fire starts after shutdown.
    pub async fn run_until<S>(&self, shutdown: S) -> Result<(), JanitorError>
    where
        S: Future<Output = ()>,
    {
        let mut scheduled = HashSet::new();
        let mut tasks = JoinSet::new();
        self.schedule_new(&mut scheduled, &mut tasks);
        tracing::info!(
            datasets = scheduled.len(),
            "Janitor worker started (idle poll: {:?})",
            self.idle_poll
        );

        let mut rescan = tokio::time::interval(self.idle_poll);
        rescan.tick().await;

        tokio::pin!(shutdown);
        let result = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received, stopping janitor");
                    break Ok(());
                }
                _ = rescan.tick() => self.schedule_new(&mut scheduled, &mut tasks),
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => match joined {
                    // Dataset loops only end by panicking or being aborted
                    Err(e) if e.is_panic() => {
                        break Err(JanitorError::Worker(format!("dataset task panicked: {}", e)));
                    }
                    _ => {}
                },
            }
        };

        tasks.shutdown().await;
        tracing::info!("Janitor stopped. Final metrics:\n{}", self.janitor.metrics().summary());

        result
    }

    /// Spawn a loop for every dataset that does not have one yet
    fn schedule_new(&self, scheduled: &mut HashSet<String>, tasks: &mut JoinSet<()>) {
        for dataset in self.janitor.datasets() {
            if scheduled.insert(dataset.clone()) {
                tracing::debug!(dataset = %dataset, "Scheduling dataset");
                tasks.spawn(dataset_loop(self.janitor.clone(), dataset, self.idle_poll));
            }
        }
    }
}

async fn dataset_loop<F, T>(janitor: Arc<Janitor<F, T>>, dataset: String, idle_poll: Duration)
where
    F: SessionFactory + 'static,
    T: Send + Sync + 'static,
{
    let schedules = janitor.validator().schedules().clone();
    let mut last_fired = None;

    loop {
        let now = Utc::now();
        let Some(next) = next_fire_after(&janitor, schedules.as_ref(), &dataset, now, last_fired) else {
            tokio::time::sleep(idle_poll).await;
            continue;
        };

        let delay = (next - now).to_std().unwrap_or(Duration::ZERO);
        tracing::debug!(dataset = %dataset, "Next cleanup in {:?}", delay);
        tokio::time::sleep(delay).await;
        last_fired = Some(next);

        let fire = {
            let janitor = janitor.clone();
            let dataset = dataset.clone();
            tokio::task::spawn_blocking(move || janitor.fire(&dataset))
        };

        match fire.await {
            Ok(Ok(RunOutcome::Completed(_))) => {}
            Ok(Ok(RunOutcome::Skipped(reason))) => {
                tracing::debug!(dataset = %dataset, ?reason, "Cleanup skipped");
            }
            // Already logged by the janitor
            Ok(Err(JanitorError::Execution { .. })) => {}
            Ok(Err(e)) => tracing::error!(dataset = %dataset, error = %e, "Cleanup not started"),
            Err(e) => tracing::error!(dataset = %dataset, error = %e, "Cleanup task failed"),
        }
    }
}

/// The dataset's next trigger; `None` when it has none
///
/// Searches from `now`, or from the last fired instant when the clock has
/// not yet moved past it.
fn next_fire_after<F: SessionFactory, T>(
    janitor: &Janitor<F, T>,
    schedules: &dyn ScheduleParser,
    dataset: &str,
    now: DateTime<Utc>,
    last_fired: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    let policy = janitor.policy(dataset)?;
    if !policy.is_enabled() {
        return None;
    }

    let after = last_fired.map_or(now, |last| last.max(now));
    schedules.next_fire(policy.schedule()?, after)
}
