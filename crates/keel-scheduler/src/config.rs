use std::time::Duration;

use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

/// Cadence and batch size of one check cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfig {
    /// How often the cycle polls for due items. Zero is treated as one second.
    pub interval_secs: u64,
    pub min_time_since_last_check_secs: u64,
    pub batch_size: usize,
}

impl CycleConfig {
    pub const fn new(interval_secs: u64, min_time_since_last_check_secs: u64, batch_size: usize) -> Self {
        Self {
            interval_secs,
            min_time_since_last_check_secs,
            batch_size,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn min_time_since_last_check(&self) -> SignedDuration {
        SignedDuration::from_secs(i64::try_from(self.min_time_since_last_check_secs).unwrap_or(i64::MAX))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub resources: CycleConfig,
    pub environments: CycleConfig,
    pub artifacts: CycleConfig,
    pub agents: CycleConfig,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            resources: CycleConfig::new(1, 60, 100),
            environments: CycleConfig::new(1, 30, 50),
            artifacts: CycleConfig::new(30, 300, 20),
            agents: CycleConfig::new(10, 60, 10),
        }
    }
}
