use std::time::Duration;

pub const SECONDS_IN_A_DAY: u64 = 60 * 60 * 24;
pub const DEFAULT_VALIDITY_DAYS: u64 = 60;

/// Engine tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum time allowed between renewals before a testament can be triggered.
    pub validity_window: Duration,
}

impl EngineConfig {
    pub fn with_validity_days(days: u64) -> Self {
        Self {
            validity_window: Duration::from_secs(days.saturating_mul(SECONDS_IN_A_DAY)),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::with_validity_days(DEFAULT_VALIDITY_DAYS)
    }
}
