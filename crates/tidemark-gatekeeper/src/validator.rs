//! Policy validation logic

use crate::{CronScheduleParser, ScheduleParser, ValidationConfig, ValidationFailure};
use std::sync::Arc;
use tidemark_domain::{CleanupPolicy, QuotaPolicy, RetentionPolicy, TimeWindowPolicy, ValidationSink};

/// Field names reported to the sink
pub mod fields {
    /// Cron expression
    pub const CRON: &str = "cron";
    /// Retention in days (also used for a missing retention length)
    pub const KEEP_DAYS: &str = "keepDays";
    /// Retention in minutes
    pub const KEEP_MINUTES: &str = "keepMinutes";
    /// Quota in megabytes
    pub const QUOTA_M: &str = "quotaM";
    /// Eviction batch in megabytes
    pub const DELETE_M: &str = "deleteM";
    /// Average row size in bytes
    pub const AVG_ITEM_SIZE: &str = "avgItemSize";
}

/// Validation status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    /// Policy may be scheduled
    Accepted,

    /// At least one field is invalid
    Rejected,

    /// Policy is disabled; nothing was inspected
    Disabled,
}

/// [`ValidationSink`] that records every reported field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldViolations {
    fields: Vec<String>,
}

impl FieldViolations {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing was reported
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reported field names, in reporting order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Whether `field` was reported
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}

impl ValidationSink for FieldViolations {
    fn invalid_field(&mut self, field: &str) {
        self.fields.push(field.to_string());
    }
}

/// Result of policy validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Outcome
    pub status: ValidationStatus,

    /// Rejected fields (empty unless `status` is `Rejected`)
    pub violations: FieldViolations,
}

impl ValidationResult {
    /// Rejected field names
    pub fn fields(&self) -> &[String] {
        self.violations.fields()
    }

    /// Whether the policy may be scheduled
    pub fn is_runnable(&self) -> bool {
        self.status == ValidationStatus::Accepted
    }
}

/// Validates retention policies before they are scheduled
///
/// Every rule reports independently, so one call surfaces all violations.
#[derive(Clone)]
pub struct PolicyValidator {
    config: ValidationConfig,
    schedules: Arc<dyn ScheduleParser>,
}

impl std::fmt::Debug for PolicyValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyValidator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PolicyValidator {
    /// Create a validator using the `cron` crate for schedules
    pub fn new(config: ValidationConfig) -> Self {
        Self::with_parser(config, Arc::new(CronScheduleParser))
    }

    /// Create a validator with a custom schedule parser
    pub fn with_parser(config: ValidationConfig, schedules: Arc<dyn ScheduleParser>) -> Self {
        Self { config, schedules }
    }

    /// Create a validator with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// The schedule parser in use
    pub fn schedules(&self) -> &Arc<dyn ScheduleParser> {
        &self.schedules
    }

    /// Report every invalid field of `policy` to `sink`
    ///
    /// A disabled policy never touches the sink.
    pub fn validate<S>(&self, policy: &RetentionPolicy, sink: &mut S)
    where
        S: ValidationSink + ?Sized,
    {
        match policy {
            RetentionPolicy::TimeWindow(policy) => self.validate_time_window(policy, sink),
            RetentionPolicy::Quota(policy) => self.validate_quota(policy, sink),
        }
    }

    /// Validate a time-window policy
    pub fn validate_time_window<S>(&self, policy: &TimeWindowPolicy, sink: &mut S)
    where
        S: ValidationSink + ?Sized,
    {
        if !policy.is_enabled() {
            return;
        }

        self.validate_schedule(policy.schedule(), sink);

        if policy.keep_days.is_some_and(|days| days < 0) {
            sink.invalid_field(fields::KEEP_DAYS);
        }

        if policy.keep_minutes.is_some_and(|minutes| minutes < 0) {
            sink.invalid_field(fields::KEEP_MINUTES);
        }

        if self.config.require_retention && !policy.has_retention() {
            sink.invalid_field(fields::KEEP_DAYS);
        }
    }

    /// Validate a quota policy
    pub fn validate_quota<S>(&self, policy: &QuotaPolicy, sink: &mut S)
    where
        S: ValidationSink + ?Sized,
    {
        if !policy.is_enabled() {
            return;
        }

        self.validate_schedule(policy.schedule(), sink);

        if policy.quota_m <= 0 {
            sink.invalid_field(fields::QUOTA_M);
        }

        if policy.delete_m <= 0 {
            sink.invalid_field(fields::DELETE_M);
        } else if self.config.reject_batch_over_quota && policy.delete_m > policy.quota_m {
            sink.invalid_field(fields::DELETE_M);
        }

        if policy.avg_item_size.is_some_and(|size| size < 0) {
            sink.invalid_field(fields::AVG_ITEM_SIZE);
        }
    }

    /// Validate and collect the outcome
    pub fn check(&self, policy: &RetentionPolicy) -> ValidationResult {
        if !policy.is_enabled() {
            return ValidationResult {
                status: ValidationStatus::Disabled,
                violations: FieldViolations::new(),
            };
        }

        let mut violations = FieldViolations::new();
        self.validate(policy, &mut violations);

        let status = if violations.is_empty() {
            ValidationStatus::Accepted
        } else {
            ValidationStatus::Rejected
        };

        ValidationResult { status, violations }
    }

    /// Fail with every rejected field if `policy` is enabled and invalid
    pub fn ensure_valid(&self, policy: &RetentionPolicy) -> Result<(), ValidationFailure> {
        let result = self.check(policy);
        if result.status == ValidationStatus::Rejected {
            return Err(ValidationFailure {
                fields: result.violations.fields,
            });
        }
        Ok(())
    }

    fn validate_schedule<S>(&self, schedule: Option<&str>, sink: &mut S)
    where
        S: ValidationSink + ?Sized,
    {
        let valid = schedule.is_some_and(|expr| !expr.is_empty() && self.schedules.is_valid(expr));
        if !valid {
            sink.invalid_field(fields::CRON);
        }
    }
}
