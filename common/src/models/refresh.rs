//! Refresh preferences.
//!
//! User-controlled polling cadence, persisted in durable client storage
//! and consulted by the scheduler on every tick decision.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Smallest accepted refresh interval in seconds.
pub const MIN_INTERVAL_SECS: u64 = 2;

/// Largest accepted refresh interval in seconds.
pub const MAX_INTERVAL_SECS: u64 = 600;

/// Interval applied when the user supplies an out-of-range value.
pub const DEFAULT_INTERVAL_SECS: u64 = 10;

/// User-controlled refresh configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Seconds between poll ticks. Always within the accepted range.
    pub interval_seconds: u64,
    /// Whether polling is user-paused.
    pub paused: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_INTERVAL_SECS,
            paused: false,
        }
    }
}

impl RefreshConfig {
    /// Sets the interval, resetting out-of-range input to the default.
    pub fn set_interval(&mut self, seconds: u64) {
        self.interval_seconds = if (MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&seconds) {
            seconds
        } else {
            DEFAULT_INTERVAL_SECS
        };
    }

    /// The interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}
