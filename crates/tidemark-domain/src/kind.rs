//! Policy kind - the two retention strategies

/// Kind of retention policy
///
/// - TimeWindow: deletes rows older than a retention window
/// - Quota: deletes the oldest rows once a byte ceiling is exceeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    /// Time-based retention window
    TimeWindow,

    /// Storage quota ceiling
    Quota,
}

impl PolicyKind {
    /// Get the kind name as it appears in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::TimeWindow => "time_window",
            PolicyKind::Quota => "quota",
        }
    }

    /// Parse a kind from its configuration name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "time_window" | "periodical" => Some(PolicyKind::TimeWindow),
            "quota" => Some(PolicyKind::Quota),
            _ => None,
        }
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid policy kind: {}", s))
    }
}
