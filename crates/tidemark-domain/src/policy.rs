//! Retention policy - the polymorphic policy value handed to the scheduler

use crate::{PolicyKind, QuotaPolicy, TimeWindowPolicy};
use serde::{Deserialize, Serialize};

/// Capability shared by every retention policy variant
pub trait CleanupPolicy {
    /// Whether the scheduler evaluates this policy at all
    fn is_enabled(&self) -> bool;

    /// Cron expression that fires the cleanup, if any
    fn schedule(&self) -> Option<&str>;

    /// Which variant this is
    fn kind(&self) -> PolicyKind;
}

impl CleanupPolicy for TimeWindowPolicy {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn schedule(&self) -> Option<&str> {
        self.cron.as_deref()
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::TimeWindow
    }
}

impl CleanupPolicy for QuotaPolicy {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn schedule(&self) -> Option<&str> {
        self.cron.as_deref()
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::Quota
    }
}

/// A retention policy of either kind
///
/// Policies are values: reconfiguration builds a new one and replaces the
/// old one wholesale, so a run in progress keeps the snapshot it started with.
///
/// Serialized with an internal `kind` tag:
///
/// ```
/// use tidemark_domain::{CleanupPolicy, RetentionPolicy};
///
/// let policy: RetentionPolicy = toml::from_str(r#"
///     kind = "quota"
///     enabled = true
///     cron = "0 */10 * * * ?"
///     quota_m = 2048
///     delete_m = 128
/// "#).unwrap();
/// assert!(policy.is_enabled());
/// assert_eq!(policy.as_quota().unwrap().delete_m, 128);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Delete rows older than a retention window
    #[serde(alias = "periodical")]
    TimeWindow(TimeWindowPolicy),

    /// Delete the oldest rows once a byte quota is exceeded
    Quota(QuotaPolicy),
}

impl RetentionPolicy {
    /// The time-window variant, if this is one
    pub fn as_time_window(&self) -> Option<&TimeWindowPolicy> {
        match self {
            RetentionPolicy::TimeWindow(policy) => Some(policy),
            RetentionPolicy::Quota(_) => None,
        }
    }

    /// The quota variant, if this is one
    pub fn as_quota(&self) -> Option<&QuotaPolicy> {
        match self {
            RetentionPolicy::Quota(policy) => Some(policy),
            RetentionPolicy::TimeWindow(_) => None,
        }
    }
}

impl CleanupPolicy for RetentionPolicy {
    fn is_enabled(&self) -> bool {
        match self {
            RetentionPolicy::TimeWindow(policy) => policy.is_enabled(),
            RetentionPolicy::Quota(policy) => policy.is_enabled(),
        }
    }

    fn schedule(&self) -> Option<&str> {
        match self {
            RetentionPolicy::TimeWindow(policy) => policy.schedule(),
            RetentionPolicy::Quota(policy) => policy.schedule(),
        }
    }

    fn kind(&self) -> PolicyKind {
        match self {
            RetentionPolicy::TimeWindow(_) => PolicyKind::TimeWindow,
            RetentionPolicy::Quota(_) => PolicyKind::Quota,
        }
    }
}

impl From<TimeWindowPolicy> for RetentionPolicy {
    fn from(policy: TimeWindowPolicy) -> Self {
        RetentionPolicy::TimeWindow(policy)
    }
}

impl From<QuotaPolicy> for RetentionPolicy {
    fn from(policy: QuotaPolicy) -> Self {
        RetentionPolicy::Quota(policy)
    }
}
