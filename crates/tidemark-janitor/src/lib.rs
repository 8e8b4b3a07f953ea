//! Tidemark Janitor
//!
//! Scheduler-side runner for retention cleanups.
//!
//! # Overview
//!
//! The Janitor is responsible for:
//! - **Policy snapshots**: the current retention policy of every dataset,
//!   replaced wholesale on reload
//! - **Executor bindings**: which [`CleanupExecutor`](tidemark_domain::CleanupExecutor)
//!   cleans which dataset
//! - **Run state**: at most one run per dataset, skipped fires when the
//!   previous run has not finished
//! - **Metrics collection**: rows deleted, failures and skips per dataset
//!
//! # Run lifecycle
//!
//! | Phase | Leaves to | When |
//! |-------|-----------|------|
//! | **Idle** | Validating | A fire arrives for the dataset |
//! | **Validating** | Idle | Policy disabled or invalid (skipped) |
//! | **Validating** | Executing | Policy valid; one session is opened |
//! | **Executing** | Idle | Executor returned, success or failure |
//!
//! # Usage
//!
//! ## One-time Run
//!
//! ```no_run
//! use std::sync::Arc;
//! use tidemark_janitor::{Janitor, JanitorConfig};
//! use tidemark_store::{SqliteCleaner, SqliteSessionFactory, TableTarget};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config: JanitorConfig<TableTarget> = JanitorConfig::from_file("tidemark.toml")?;
//! let factory = SqliteSessionFactory::from_url(&config.database_url)?;
//! let janitor = Janitor::from_config(factory, &config, Arc::new(SqliteCleaner::new()));
//!
//! for (dataset, outcome) in janitor.fire_all() {
//!     println!("{}: {:?}", dataset, outcome);
//! }
//! println!("{}", janitor.metrics().summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Background Worker
//!
//! ```no_run
//! use std::sync::Arc;
//! use tidemark_janitor::{Janitor, JanitorConfig, JanitorWorker};
//! use tidemark_store::{SqliteCleaner, SqliteSessionFactory, TableTarget};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config: JanitorConfig<TableTarget> = JanitorConfig::from_file("tidemark.toml")?;
//!     let factory = SqliteSessionFactory::from_url(&config.database_url)?;
//!     let janitor = Janitor::from_config(factory, &config, Arc::new(SqliteCleaner::new()));
//!
//!     // Run indefinitely (until Ctrl+C)
//!     JanitorWorker::new(Arc::new(janitor), &config.worker).run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! database_url = "jdbc:sqlite:/var/lib/tidemark/history.db"
//!
//! [validation]
//! reject_batch_over_quota = false
//!
//! [worker]
//! idle_poll_secs = 60
//!
//! [[datasets]]
//! name = "position_log"
//! table = "position_log"
//! timestamp_column = "recorded_at"
//!
//! [datasets.policy]
//! kind = "time_window"
//! enabled = true
//! cron = "0 0 3 * * ?"
//! keep_days = 30
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod janitor;
mod metrics;
mod registry;
mod request;
mod worker;

pub use config::{DatasetConfig, JanitorConfig, WorkerConfig};
pub use error::{ConfigFileError, JanitorError};
pub use janitor::{Janitor, RunOutcome, RunPhase, SkipReason};
pub use metrics::{DatasetMetrics, JanitorMetrics};
pub use registry::{ExecutorRegistry, SharedExecutor};
pub use request::CleanupRequest;
pub use worker::JanitorWorker;
