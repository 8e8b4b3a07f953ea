//! Time-window retention policy
//!
//! Keeps a fixed span of history and makes everything older eligible for
//! deletion. The span is an integer count of days or minutes; when both are
//! given the minute count wins.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_DAY: u64 = 24 * 60 * SECS_PER_MINUTE;

/// One week plus a day of slack
pub const KEEP_DAYS_ONE_WEEK: i32 = 8;
/// One month (31 days) plus a day of slack
pub const KEEP_DAYS_ONE_MONTH: i32 = 32;
/// Half a year
pub const KEEP_DAYS_HALF_YEAR: i32 = 183;

/// [`KEEP_DAYS_ONE_WEEK`] in minutes
pub const KEEP_MINUTES_ONE_WEEK: i32 = KEEP_DAYS_ONE_WEEK * 24 * 60;
/// [`KEEP_DAYS_ONE_MONTH`] in minutes
pub const KEEP_MINUTES_ONE_MONTH: i32 = KEEP_DAYS_ONE_MONTH * 24 * 60;
/// [`KEEP_DAYS_HALF_YEAR`] in minutes
pub const KEEP_MINUTES_HALF_YEAR: i32 = KEEP_DAYS_HALF_YEAR * 24 * 60;

/// Time-based retention policy
///
/// # Examples
///
/// ```
/// use std::time::{Duration, SystemTime};
/// use tidemark_domain::TimeWindowPolicy;
///
/// let policy = TimeWindowPolicy::keep_days("0 0 3 * * ?", 30);
/// let now = SystemTime::now();
/// let cutoff = policy.cutoff_instant(now).unwrap();
/// assert_eq!(now.duration_since(cutoff).unwrap(), Duration::from_secs(30 * 86_400));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindowPolicy {
    /// Whether the policy is evaluated at all
    #[serde(default)]
    pub enabled: bool,

    /// Cron expression (seconds first) that fires the cleanup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,

    /// Retention in days
    #[serde(default, alias = "keepDays", skip_serializing_if = "Option::is_none")]
    pub keep_days: Option<i32>,

    /// Retention in minutes; takes precedence over `keep_days`.
    /// Mostly used for short-lived debugging setups.
    #[serde(default, alias = "keepMinutes", skip_serializing_if = "Option::is_none")]
    pub keep_minutes: Option<i32>,
}

impl TimeWindowPolicy {
    /// Create a policy from raw configuration values
    pub fn new(
        enabled: bool,
        cron: Option<String>,
        keep_days: Option<i32>,
        keep_minutes: Option<i32>,
    ) -> Self {
        Self {
            enabled,
            cron,
            keep_days,
            keep_minutes,
        }
    }

    /// Enabled policy keeping `days` days of history
    pub fn keep_days(cron: impl Into<String>, days: i32) -> Self {
        Self::new(true, Some(cron.into()), Some(days), None)
    }

    /// Enabled policy keeping `minutes` minutes of history
    pub fn keep_minutes(cron: impl Into<String>, minutes: i32) -> Self {
        Self::new(true, Some(cron.into()), None, Some(minutes))
    }

    /// Disabled policy with no other fields set
    pub fn disabled() -> Self {
        Self::new(false, None, None, None)
    }

    /// Keep one week of history (8 days)
    pub fn one_week(cron: impl Into<String>) -> Self {
        Self::keep_days(cron, KEEP_DAYS_ONE_WEEK)
    }

    /// Keep one month of history (32 days)
    pub fn one_month(cron: impl Into<String>) -> Self {
        Self::keep_days(cron, KEEP_DAYS_ONE_MONTH)
    }

    /// Keep half a year of history (183 days)
    pub fn half_year(cron: impl Into<String>) -> Self {
        Self::keep_days(cron, KEEP_DAYS_HALF_YEAR)
    }

    /// Retention in minutes, or `default` when neither count is set
    pub fn keep_minutes_or(&self, default: i64) -> i64 {
        match (self.keep_minutes, self.keep_days) {
            (Some(minutes), _) => i64::from(minutes),
            (None, Some(days)) => i64::from(days) * 24 * 60,
            (None, None) => default,
        }
    }

    /// Retention in seconds, or `default` when neither count is set
    pub fn keep_seconds_or(&self, default: i64) -> i64 {
        match (self.keep_minutes, self.keep_days) {
            (Some(minutes), _) => i64::from(minutes) * SECS_PER_MINUTE as i64,
            (None, Some(days)) => i64::from(days) * SECS_PER_DAY as i64,
            (None, None) => default,
        }
    }

    /// Whether a retention length was supplied at all
    pub fn has_retention(&self) -> bool {
        self.keep_minutes.is_some() || self.keep_days.is_some()
    }

    /// Length of history to keep
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingRetention`] when neither count is set,
    /// [`ConfigError::NegativeRetention`] when the authoritative count is negative.
    pub fn retention(&self) -> Result<Duration, ConfigError> {
        let (field, value, unit_secs) = match (self.keep_minutes, self.keep_days) {
            (Some(minutes), _) => ("keepMinutes", minutes, SECS_PER_MINUTE),
            (None, Some(days)) => ("keepDays", days, SECS_PER_DAY),
            (None, None) => return Err(ConfigError::MissingRetention),
        };

        let count = u64::try_from(value).map_err(|_| ConfigError::NegativeRetention {
            field,
            value: i64::from(value),
        })?;

        Ok(Duration::from_secs(count * unit_secs))
    }

    /// Boundary instant: rows strictly older than this are eligible for deletion
    pub fn cutoff_instant(&self, now: SystemTime) -> Result<SystemTime, ConfigError> {
        let keep = self.retention()?;
        Ok(now.checked_sub(keep).unwrap_or(UNIX_EPOCH))
    }

    /// [`cutoff_instant`](Self::cutoff_instant) as milliseconds since the Unix epoch
    ///
    /// Instants before the epoch clamp to 0.
    pub fn cutoff_millis(&self, now: SystemTime) -> Result<i64, ConfigError> {
        let cutoff = self.cutoff_instant(now)?;
        let millis = cutoff
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Ok(i64::try_from(millis).unwrap_or(i64::MAX))
    }
}
