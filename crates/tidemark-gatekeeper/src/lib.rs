//! Tidemark Gatekeeper
//!
//! Checks retention policies for self-consistency before they are allowed
//! to run.
//!
//! The Gatekeeper provides:
//! - Cron expression checking through a pluggable [`ScheduleParser`]
//! - Retention length checks for time-window policies
//! - Quota and batch size checks for quota policies
//! - Field-level reporting to a [`ValidationSink`](tidemark_domain::ValidationSink)
//!   that never stops at the first violation
//!
//! A disabled policy is always valid, so operators can stage configuration
//! before switching it on.
//!
//! # Examples
//!
//! ```
//! use tidemark_domain::TimeWindowPolicy;
//! use tidemark_gatekeeper::{PolicyValidator, ValidationStatus};
//!
//! let validator = PolicyValidator::default_config();
//!
//! let mut policy = TimeWindowPolicy::keep_days("", 30);
//! policy.keep_days = Some(-1);
//!
//! let result = validator.check(&policy.into());
//! assert_eq!(result.status, ValidationStatus::Rejected);
//! assert_eq!(result.fields(), ["cron", "keepDays"]);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod schedule;
mod validator;

pub use config::ValidationConfig;
pub use error::ValidationFailure;
pub use schedule::{CronScheduleParser, ScheduleParser};
pub use validator::{fields, FieldViolations, PolicyValidator, ValidationResult, ValidationStatus};
