use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Largest payload accepted by default, in bytes.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1024;

/// Default pause between two reporter scans.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(10);

/// Shortest pause the reporter accepts; smaller intervals are raised to it.
pub const MIN_REPORT_INTERVAL: Duration = Duration::from_millis(1);

/// Tunables for a [`ChunkManager`](crate::ChunkManager).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Payloads longer than this are rejected.
    pub max_chunk_size: usize,
    /// Reporter interval in milliseconds.
    pub report_interval_ms: u64,
}

impl ManagerConfig {
    /// Reporter interval as a [`Duration`], never below
    /// [`MIN_REPORT_INTERVAL`].
    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms).max(MIN_REPORT_INTERVAL)
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            report_interval_ms: DEFAULT_REPORT_INTERVAL.as_millis() as u64,
        }
    }
}
