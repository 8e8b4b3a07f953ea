//! Run-once command implementation.

use crate::cli::RunOnceArgs;
use crate::config::{build_janitor, AppConfig};
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the run-once command.
pub fn execute_run_once(args: RunOnceArgs, config: &AppConfig, formatter: &Formatter) -> Result<()> {
    let janitor = build_janitor(config)?;

    let outcomes = match args.dataset {
        Some(dataset) => {
            if config.dataset(&dataset).is_none() {
                return Err(CliError::InvalidInput(format!("Unknown dataset '{}'", dataset)));
            }
            let outcome = janitor.fire(&dataset);
            vec![(dataset, outcome)]
        }
        None => janitor.fire_all(),
    };

    println!("{}", formatter.format_outcomes(&outcomes)?);
    tracing::debug!("{}", janitor.metrics().summary());

    let failed = outcomes.iter().filter(|(_, outcome)| outcome.is_err()).count();
    if failed > 0 {
        return Err(CliError::RunsFailed(failed));
    }
    Ok(())
}
