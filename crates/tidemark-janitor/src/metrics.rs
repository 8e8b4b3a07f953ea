//! Metrics collection for Janitor operations

use std::collections::BTreeMap;
use std::time::Duration;
use tidemark_domain::CleanupReport;

/// Counters for a single dataset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetMetrics {
    /// Runs that completed
    pub runs: usize,

    /// Runs whose executor failed
    pub failures: usize,

    /// Fires skipped (disabled, invalid or already running)
    pub skipped: usize,

    /// Rows deleted across all runs
    pub rows_deleted: u64,

    /// Bytes freed, for runs that could tell
    pub bytes_freed: u64,
}

/// Metrics collected during Janitor operations
///
/// Tracks runs, failures, skips, rows deleted and bytes freed per dataset.
#[derive(Debug, Clone, Default)]
pub struct JanitorMetrics {
    /// Counters per dataset name
    pub datasets: BTreeMap<String, DatasetMetrics>,

    /// Total time spent executing, in milliseconds
    pub total_runtime_ms: u64,
}

impl JanitorMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, dataset: &str) -> &mut DatasetMetrics {
        self.datasets.entry(dataset.to_string()).or_default()
    }

    /// Record a completed run
    pub fn record_run(&mut self, dataset: &str, report: &CleanupReport, elapsed: Duration) {
        let entry = self.entry(dataset);
        entry.runs += 1;
        entry.rows_deleted += report.rows_deleted;
        entry.bytes_freed += report.bytes_freed.unwrap_or(0);
        self.add_runtime(elapsed);
    }

    /// Record a failed run
    pub fn record_failure(&mut self, dataset: &str, elapsed: Duration) {
        self.entry(dataset).failures += 1;
        self.add_runtime(elapsed);
    }

    /// Record a skipped fire
    pub fn record_skip(&mut self, dataset: &str) {
        self.entry(dataset).skipped += 1;
    }

    fn add_runtime(&mut self, elapsed: Duration) {
        let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.total_runtime_ms = self.total_runtime_ms.saturating_add(millis);
    }

    /// Counters for one dataset
    pub fn dataset(&self, dataset: &str) -> Option<&DatasetMetrics> {
        self.datasets.get(dataset)
    }

    /// Completed runs across all datasets
    pub fn total_runs(&self) -> usize {
        self.datasets.values().map(|m| m.runs).sum()
    }

    /// Failed runs across all datasets
    pub fn total_failures(&self) -> usize {
        self.datasets.values().map(|m| m.failures).sum()
    }

    /// Skipped fires across all datasets
    pub fn total_skipped(&self) -> usize {
        self.datasets.values().map(|m| m.skipped).sum()
    }

    /// Rows deleted across all datasets
    pub fn total_deleted(&self) -> u64 {
        self.datasets.values().map(|m| m.rows_deleted).sum()
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        self.datasets.clear();
        self.total_runtime_ms = 0;
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Janitor Metrics Summary".to_string(),
            "=======================".to_string(),
            format!("Runs: {}", self.total_runs()),
            format!("Failures: {}", self.total_failures()),
            format!("Skipped: {}", self.total_skipped()),
            format!("Total runtime: {}ms", self.total_runtime_ms),
        ];

        if !self.datasets.is_empty() {
            lines.push(String::new());
            lines.push("By dataset:".to_string());
            for (name, m) in &self.datasets {
                lines.push(format!(
                    "  {}: {} rows deleted, {} bytes freed ({} runs, {} failed, {} skipped)",
                    name, m.rows_deleted, m.bytes_freed, m.runs, m.failures, m.skipped
                ));
            }
            lines.push(format!("  Total deleted: {}", self.total_deleted()));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(rows: u64, bytes: Option<u64>) -> CleanupReport {
        CleanupReport {
            rows_deleted: rows,
            bytes_freed: bytes,
            occupied_before: None,
        }
    }

    #[test]
    fn test_metrics_creation() {
        let metrics = JanitorMetrics::new();
        assert_eq!(metrics.total_runs(), 0);
        assert_eq!(metrics.total_deleted(), 0);
        assert!(metrics.dataset("log").is_none());
    }

    #[test]
    fn test_record_run() {
        let mut metrics = JanitorMetrics::new();
        metrics.record_run("position_log", &report(5, None), Duration::from_millis(10));
        metrics.record_run("position_log", &report(2, Some(2048)), Duration::from_millis(5));
        metrics.record_run("alarm_log", &report(3, None), Duration::ZERO);

        let position = metrics.dataset("position_log").unwrap();
        assert_eq!(position.runs, 2);
        assert_eq!(position.rows_deleted, 7);
        assert_eq!(position.bytes_freed, 2048);
        assert_eq!(metrics.total_deleted(), 10);
        assert_eq!(metrics.total_runtime_ms, 15);
    }

    #[test]
    fn test_record_failure_and_skip() {
        let mut metrics = JanitorMetrics::new();
        metrics.record_failure("log", Duration::from_millis(1));
        metrics.record_skip("log");
        metrics.record_skip("log");

        let log = metrics.dataset("log").unwrap();
        assert_eq!(log.failures, 1);
        assert_eq!(log.skipped, 2);
        assert_eq!(log.runs, 0);
        assert_eq!(metrics.total_failures(), 1);
        assert_eq!(metrics.total_skipped(), 2);
    }

    #[test]
    fn test_reset() {
        let mut metrics = JanitorMetrics::new();
        metrics.record_run("log", &report(10, None), Duration::from_secs(1));
        metrics.reset();

        assert_eq!(metrics.total_deleted(), 0);
        assert_eq!(metrics.total_runtime_ms, 0);
        assert!(metrics.datasets.is_empty());
    }

    #[test]
    fn test_summary() {
        let mut metrics = JanitorMetrics::new();
        metrics.record_run("position_log", &report(5, Some(100)), Duration::from_millis(120));
        metrics.record_skip("alarm_log");

        let summary = metrics.summary();
        assert!(summary.contains("Runs: 1"));
        assert!(summary.contains("Skipped: 1"));
        assert!(summary.contains("Total runtime: 120ms"));
        assert!(summary.contains("position_log: 5 rows deleted, 100 bytes freed"));
        assert!(summary.contains("Total deleted: 5"));
    }
}
