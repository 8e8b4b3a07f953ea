//! Daemon command implementation.

use crate::config::{build_janitor, AppConfig};
use crate::error::Result;
use crate::output::Formatter;
use std::sync::Arc;
use tidemark_janitor::JanitorWorker;

/// Execute the daemon command; returns after Ctrl+C.
pub async fn execute_daemon(config: &AppConfig, formatter: &Formatter) -> Result<()> {
    let janitor = build_janitor(config)?;
    println!(
        "{}",
        formatter.info(&format!("Scheduling {} dataset(s)", janitor.datasets().len()))
    );

    let worker = JanitorWorker::new(Arc::new(janitor), &config.worker);
    worker.run().await?;

    println!("{}", worker.metrics().summary());
    Ok(())
}
