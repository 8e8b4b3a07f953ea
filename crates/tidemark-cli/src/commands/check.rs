//! Check command implementation.

use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::output::{Formatter, ValidationRow};
use tidemark_domain::CleanupPolicy;
use tidemark_gatekeeper::{PolicyValidator, ValidationStatus};

/// Validate every configured policy without touching the database.
pub fn validate_all(config: &AppConfig) -> Vec<ValidationRow> {
    let validator = PolicyValidator::new(config.validation.clone());

    config
        .datasets
        .iter()
        .map(|dataset| {
            let result = validator.check(&dataset.policy);
            let status = match result.status {
                ValidationStatus::Accepted => "accepted",
                ValidationStatus::Rejected => "rejected",
                ValidationStatus::Disabled => "disabled",
            };
            ValidationRow {
                dataset: dataset.name.clone(),
                kind: dataset.policy.kind().to_string(),
                status: status.to_string(),
                fields: result.fields().to_vec(),
            }
        })
        .collect()
}

/// Execute the check command.
pub fn execute_check(config: &AppConfig, formatter: &Formatter) -> Result<()> {
    let rows = validate_all(config);
    println!("{}", formatter.format_validation(&rows)?);

    let rejected = rows.iter().filter(|row| row.status == "rejected").count();
    if rejected > 0 {
        return Err(CliError::InvalidPolicies(rejected));
    }
    Ok(())
}
