//! Output formatting for the CLI.

use crate::cli::CliFormat;
use crate::error::Result;
use colored::*;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use tidemark_janitor::{JanitorError, RunOutcome, SkipReason};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Json => OutputFormat::Json,
        }
    }
}

/// Validation outcome of one dataset, as printed by `check`.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationRow {
    /// Dataset name
    pub dataset: String,
    /// Policy kind
    pub kind: String,
    /// accepted, rejected or disabled
    pub status: String,
    /// Rejected fields
    pub fields: Vec<String>,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format validation results.
    pub fn format_validation(&self, rows: &[ValidationRow]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
            OutputFormat::Table => Ok(self.format_validation_table(rows)),
        }
    }

    fn format_validation_table(&self, rows: &[ValidationRow]) -> String {
        if rows.is_empty() {
            return self.colorize("No datasets configured.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Dataset", "Kind", "Status", "Invalid fields"]);

        for row in rows {
            let status = match row.status.as_str() {
                "accepted" => self.colorize(&row.status, "green"),
                "rejected" => self.colorize(&row.status, "red"),
                _ => self.colorize(&row.status, "yellow"),
            };
            builder.push_record([
                row.dataset.clone(),
                row.kind.clone(),
                status,
                row.fields.join(", "),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format the outcomes of a batch of cleanup runs.
    pub fn format_outcomes(&self, outcomes: &[(String, std::result::Result<RunOutcome, JanitorError>)]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let values: Vec<serde_json::Value> = outcomes
                    .iter()
                    .map(|(dataset, outcome)| outcome_json(dataset, outcome))
                    .collect();
                Ok(serde_json::to_string_pretty(&values)?)
            }
            OutputFormat::Table => {
                if outcomes.is_empty() {
                    return Ok(self.colorize("No datasets configured.", "yellow"));
                }
                let lines: Vec<String> = outcomes
                    .iter()
                    .map(|(dataset, outcome)| self.format_outcome(dataset, outcome))
                    .collect();
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format a single cleanup run outcome.
    pub fn format_outcome(&self, dataset: &str, outcome: &std::result::Result<RunOutcome, JanitorError>) -> String {
        match outcome {
            Ok(RunOutcome::Completed(report)) => {
                let mut msg = format!("{}: deleted {} row(s)", dataset, report.rows_deleted);
                if let Some(bytes) = report.bytes_freed {
                    msg.push_str(&format!(", freed {} byte(s)", bytes));
                }
                self.success(&msg)
            }
            Ok(RunOutcome::Skipped(SkipReason::Disabled)) => self.info(&format!("{}: skipped (disabled)", dataset)),
            Ok(RunOutcome::Skipped(SkipReason::Invalid(fields))) => self.warning(&format!(
                "{}: skipped (invalid fields: {})",
                dataset,
                fields.join(", ")
            )),
            Ok(RunOutcome::Skipped(SkipReason::AlreadyRunning)) => {
                self.warning(&format!("{}: skipped (already running)", dataset))
            }
            Err(e) => self.error(&e.to_string()),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn outcome_json(dataset: &str, outcome: &std::result::Result<RunOutcome, JanitorError>) -> serde_json::Value {
    match outcome {
        Ok(RunOutcome::Completed(report)) => serde_json::json!({
            "dataset": dataset,
            "status": "completed",
            "rows_deleted": report.rows_deleted,
            "bytes_freed": report.bytes_freed,
            "occupied_before": report.occupied_before,
        }),
        Ok(RunOutcome::Skipped(reason)) => {
            let (reason, fields) = match reason {
                SkipReason::Disabled => ("disabled", Vec::new()),
                SkipReason::Invalid(fields) => ("invalid", fields.clone()),
                SkipReason::AlreadyRunning => ("already_running", Vec::new()),
            };
            serde_json::json!({
                "dataset": dataset,
                "status": "skipped",
                "reason": reason,
                "fields": fields,
            })
        }
        Err(e) => serde_json::json!({
            "dataset": dataset,
            "status": "failed",
            "error": e.to_string(),
        }),
    }
}
