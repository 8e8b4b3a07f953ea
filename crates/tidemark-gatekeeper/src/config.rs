//! Gatekeeper configuration

use serde::{Deserialize, Serialize};

/// Configuration for validation rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Reject quota policies whose eviction batch is larger than the quota.
    /// Such a batch can delete far more than needed in a single pass.
    #[serde(default)]
    pub reject_batch_over_quota: bool,

    /// Report a time-window policy with neither keepDays nor keepMinutes
    /// as an invalid `keepDays` field
    #[serde(default = "default_true")]
    pub require_retention: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            reject_batch_over_quota: false,
            require_retention: true,
        }
    }
}

impl ValidationConfig {
    /// Create a strict configuration (all checks enabled)
    pub fn strict() -> Self {
        Self {
            reject_batch_over_quota: true,
            require_retention: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ValidationConfig::default();
        assert!(!config.reject_batch_over_quota);
        assert!(config.require_retention);
    }

    #[test]
    fn test_strict_config() {
        let config = ValidationConfig::strict();
        assert!(config.reject_batch_over_quota);
    }
}
