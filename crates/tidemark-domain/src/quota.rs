//! Storage-quota policy
//!
//! Sizes are configured in megabytes and used in bytes.

use serde::{Deserialize, Serialize};

/// Bytes in one configured megabyte
pub const BYTES_PER_MEGABYTE: u64 = 1024 * 1024;

/// Quota-based eviction policy
///
/// When a dataset occupies more than [`quota_bytes`](Self::quota_bytes),
/// one pass deletes the oldest rows until
/// [`delete_batch_bytes`](Self::delete_batch_bytes) has been freed.
///
/// # Examples
///
/// ```
/// use tidemark_domain::QuotaPolicy;
///
/// let policy = QuotaPolicy::new("0 */5 * * * ?", 1024, 64);
/// assert_eq!(policy.quota_bytes(), 1024 * 1_048_576);
/// assert_eq!(policy.delete_batch_bytes(), 64 * 1_048_576);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaPolicy {
    /// Whether the policy is evaluated at all
    #[serde(default)]
    pub enabled: bool,

    /// Cron expression (seconds first) for the quota check.
    /// Absent in the legacy schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,

    /// Quota in megabytes
    #[serde(default, alias = "quotaM", alias = "quotaInM")]
    pub quota_m: i64,

    /// Amount to free per eviction pass, in megabytes
    #[serde(default, alias = "deleteM", alias = "deleteInM")]
    pub delete_m: i64,

    /// Average row size in bytes, used to estimate occupancy from a row count
    #[serde(default, alias = "avgItemSize", skip_serializing_if = "Option::is_none")]
    pub avg_item_size: Option<i64>,
}

impl QuotaPolicy {
    /// Enabled policy with the given quota and batch size (both in megabytes)
    pub fn new(cron: impl Into<String>, quota_m: i64, delete_m: i64) -> Self {
        Self {
            enabled: true,
            cron: Some(cron.into()),
            quota_m,
            delete_m,
            avg_item_size: None,
        }
    }

    /// Disabled policy with no other fields set
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            cron: None,
            quota_m: 0,
            delete_m: 0,
            avg_item_size: None,
        }
    }

    /// Set the average row size in bytes
    pub fn with_avg_item_size(mut self, bytes: i64) -> Self {
        self.avg_item_size = Some(bytes);
        self
    }

    /// Quota in bytes
    pub fn quota_bytes(&self) -> u64 {
        megabytes_to_bytes(self.quota_m)
    }

    /// Amount to free per eviction pass, in bytes
    pub fn delete_batch_bytes(&self) -> u64 {
        megabytes_to_bytes(self.delete_m)
    }

    /// Average row size in bytes; `None` when not configured or negative
    pub fn avg_item_size_bytes(&self) -> Option<u64> {
        self.avg_item_size.and_then(|size| u64::try_from(size).ok())
    }

    /// Estimate occupied bytes from a row count
    ///
    /// Returns `None` when no average row size is configured.
    pub fn estimate_occupied(&self, row_count: u64) -> Option<u64> {
        self.avg_item_size_bytes()
            .map(|avg| row_count.saturating_mul(avg))
    }

    /// Whether `occupied_bytes` is over the quota
    pub fn is_exceeded(&self, occupied_bytes: u64) -> bool {
        occupied_bytes > self.quota_bytes()
    }
}

fn megabytes_to_bytes(megabytes: i64) -> u64 {
    u64::try_from(megabytes)
        .unwrap_or(0)
        .saturating_mul(BYTES_PER_MEGABYTE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unit_conversion() {
        let policy = QuotaPolicy::new("0 0 * * * ?", 10, 2);
        assert_eq!(policy.quota_bytes(), 10_485_760);
        assert_eq!(policy.delete_batch_bytes(), 2_097_152);
    }

    #[test]
    fn test_negative_megabytes_clamp_to_zero() {
        let policy = QuotaPolicy::new("0 0 * * * ?", -1, -3);
        assert_eq!(policy.quota_bytes(), 0);
        assert_eq!(policy.delete_batch_bytes(), 0);
    }

    #[test]
    fn test_estimate_occupied() {
        let policy = QuotaPolicy::new("0 0 * * * ?", 1, 1);
        assert_eq!(policy.estimate_occupied(100), None);

        let policy = policy.with_avg_item_size(512);
        assert_eq!(policy.estimate_occupied(100), Some(51_200));
        assert_eq!(policy.estimate_occupied(u64::MAX), Some(u64::MAX));
    }

    #[test]
    fn test_negative_avg_item_size_is_ignored() {
        let policy = QuotaPolicy::new("0 0 * * * ?", 1, 1).with_avg_item_size(-8);
        assert_eq!(policy.avg_item_size_bytes(), None);
        assert_eq!(policy.estimate_occupied(10), None);
    }

    #[test]
    fn test_is_exceeded() {
        let policy = QuotaPolicy::new("0 0 * * * ?", 1, 1);
        assert!(!policy.is_exceeded(BYTES_PER_MEGABYTE));
        assert!(policy.is_exceeded(BYTES_PER_MEGABYTE + 1));
    }

    #[test]
    fn test_legacy_schema() {
        // Oldest schema: no cron, "InM" suffixes
        let json = r#"{"enabled": true, "quotaInM": 500, "deleteInM": 50, "avgItemSize": 300}"#;
        let policy: QuotaPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(policy.cron, None);
        assert_eq!(policy.quota_m, 500);
        assert_eq!(policy.delete_m, 50);
        assert_eq!(policy.avg_item_size, Some(300));

        let json = r#"{"enabled": true, "cron": "0 0 * * * ?", "quotaM": 5, "deleteM": 1}"#;
        let policy: QuotaPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(policy.quota_bytes(), 5 * BYTES_PER_MEGABYTE);
    }

    proptest! {
        #[test]
        fn prop_megabytes_to_bytes(quota in 0i64..1_000_000_000, delete in 0i64..1_000_000_000) {
            let policy = QuotaPolicy::new("0 0 * * * ?", quota, delete);
            prop_assert_eq!(policy.quota_bytes(), quota as u64 * 1_048_576);
            prop_assert_eq!(policy.delete_batch_bytes(), delete as u64 * 1_048_576);
        }
    }
}
