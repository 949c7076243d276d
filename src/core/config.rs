//! Deployment-tunable engine settings.

use super::constants::*;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Values a deployment may override. Everything else lives in
/// [`super::constants`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub free_offline_cap_seconds: i64,
    pub extended_offline_cap_seconds: i64,
    pub offline_min_seconds: i64,
    pub offline_discount: f64,
    /// Highest level reachable before the paywall prompt.
    pub free_max_level: u32,
    /// Length of one scheduler tick in seconds.
    pub tick_seconds: f64,
    pub gain_period_ticks: u64,
    pub event_poll_period_ticks: u64,
    pub autosave_period_ticks: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            free_offline_cap_seconds: FREE_OFFLINE_CAP_SECONDS,
            extended_offline_cap_seconds: EXTENDED_OFFLINE_CAP_SECONDS,
            offline_min_seconds: OFFLINE_MIN_SECONDS,
            offline_discount: OFFLINE_DISCOUNT,
            free_max_level: FREE_MAX_LEVEL,
            tick_seconds: TICK_SECONDS,
            gain_period_ticks: GAIN_PERIOD_TICKS,
            event_poll_period_ticks: EVENT_POLL_PERIOD_TICKS,
            autosave_period_ticks: AUTOSAVE_PERIOD_TICKS,
        }
    }
}

impl EngineConfig {
    pub fn offline_cap_seconds(&self, has_extended_cap: bool) -> i64 {
        if has_extended_cap {
            self.extended_offline_cap_seconds
        } else {
            self.free_offline_cap_seconds
        }
    }

    /// Loads a JSON config file, falling back to defaults when it is
    /// missing or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid engine config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "engine config unreadable, using defaults");
                Self::default()
            }
        }
    }
}

/// Replication timing.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationConfig {
    /// Quiet period after the last push before sending.
    pub debounce: Duration,
    /// Interval of the unconditional resend of the latest snapshot.
    pub force_push_interval: Duration,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(SYNC_DEBOUNCE_MS),
            force_push_interval: Duration::from_secs(SYNC_FORCE_PUSH_SECONDS),
        }
    }
}
