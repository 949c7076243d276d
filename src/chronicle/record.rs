//! Per-life statistics kept alongside the progression state.

use crate::core::constants::{RISKY_BREAK_THRESHOLD, SECONDS_PER_DAY, STEADY_BREAK_THRESHOLD};
use serde::{Deserialize, Serialize};

/// Statistics for one life, from first login to rebirth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifeRecord {
    pub started_at: i64,
    /// Set on the first ascension of this life.
    pub finished_at: Option<i64>,
    pub last_login_at: i64,

    pub break_attempts: u64,
    pub break_failures: u64,
    pub break_successes: u64,

    /// Last successful breakthrough, or the start of the life.
    pub last_break_at: i64,
    /// Longest time spent without a successful breakthrough.
    pub longest_stagnation_seconds: i64,
    pub longest_stagnation_realm: Option<String>,

    pub events_triggered: u64,
    pub events_accepted: u64,
    pub events_rejected: u64,

    /// Attempts made at odds below the risky threshold.
    pub risky_break_count: u64,
    /// Attempts made at odds above the steady threshold.
    pub steady_break_count: u64,
}

impl Default for LifeRecord {
    fn default() -> Self {
        Self::new(0)
    }
}

impl LifeRecord {
    pub fn new(now: i64) -> Self {
        Self {
            started_at: now,
            finished_at: None,
            last_login_at: now,
            break_attempts: 0,
            break_failures: 0,
            break_successes: 0,
            last_break_at: now,
            longest_stagnation_seconds: 0,
            longest_stagnation_realm: None,
            events_triggered: 0,
            events_accepted: 0,
            events_rejected: 0,
            risky_break_count: 0,
            steady_break_count: 0,
        }
    }

    pub fn track_login(&mut self, now: i64, realm: &str) {
        self.last_login_at = now;
        self.update_stagnation(now, realm);
    }

    /// Records one breakthrough attempt made at `success_rate` odds.
    /// `realm` is the realm the attempt was made from.
    pub fn track_break(&mut self, now: i64, success: bool, success_rate: f64, realm: &str) {
        self.break_attempts += 1;

        if success_rate < RISKY_BREAK_THRESHOLD {
            self.risky_break_count += 1;
        } else if success_rate > STEADY_BREAK_THRESHOLD {
            self.steady_break_count += 1;
        }

        if success {
            self.update_stagnation(now, realm);
            self.last_break_at = now;
            self.break_successes += 1;
        } else {
            self.break_failures += 1;
        }
    }

    pub fn track_event(&mut self, accepted: bool) {
        self.events_triggered += 1;
        if accepted {
            self.events_accepted += 1;
        } else {
            self.events_rejected += 1;
        }
    }

    /// Only the first ascension of a life counts.
    pub fn track_ascension(&mut self, now: i64) {
        if self.finished_at.is_none() {
            self.finished_at = Some(now);
        }
    }

    fn update_stagnation(&mut self, now: i64, realm: &str) {
        let duration = now - self.last_break_at;
        if duration > self.longest_stagnation_seconds {
            self.longest_stagnation_seconds = duration;
            self.longest_stagnation_realm = Some(realm.to_string());
        }
    }

    /// Whole days cultivated in this life, at least one.
    pub fn total_days(&self, now: i64) -> i64 {
        let end = self.finished_at.unwrap_or(now);
        ((end - self.started_at) / SECONDS_PER_DAY).max(1)
    }

    pub fn max_stagnation_days(&self) -> i64 {
        self.longest_stagnation_seconds / SECONDS_PER_DAY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_break_tracking_classifies_risk() {
        let mut record = LifeRecord::new(0);
        record.track_break(10, true, 0.95, "筑基");
        record.track_break(20, false, 0.55, "筑基");
        record.track_break(30, false, 0.75, "筑基");

        assert_eq!(record.break_attempts, 3);
        assert_eq!(record.break_successes, 1);
        assert_eq!(record.break_failures, 2);
        assert_eq!(record.steady_break_count, 1);
        assert_eq!(record.risky_break_count, 1);
        assert_eq!(record.last_break_at, 10);
    }

    #[test]
    fn test_stagnation_remembers_longest_gap_and_realm() {
        let mut record = LifeRecord::new(0);
        record.track_break(100, true, 0.9, "筑基");
        record.track_break(5_000, true, 0.9, "金丹");
        record.track_break(5_200, true, 0.9, "元婴");

        assert_eq!(record.longest_stagnation_seconds, 4_900);
        assert_eq!(record.longest_stagnation_realm.as_deref(), Some("金丹"));
    }

    #[test]
    fn test_login_counts_ongoing_stagnation() {
        let mut record = LifeRecord::new(0);
        record.track_login(3 * SECONDS_PER_DAY, "开光");
        assert_eq!(record.max_stagnation_days(), 3);
        assert_eq!(record.last_login_at, 3 * SECONDS_PER_DAY);
    }

    #[test]
    fn test_events_and_ascension() {
        let mut record = LifeRecord::new(0);
        record.track_event(true);
        record.track_event(false);
        assert_eq!(record.events_triggered, 2);
        assert_eq!(record.events_accepted, 1);
        assert_eq!(record.events_rejected, 1);

        record.track_ascension(10 * SECONDS_PER_DAY);
        record.track_ascension(20 * SECONDS_PER_DAY);
        assert_eq!(record.finished_at, Some(10 * SECONDS_PER_DAY));
        assert_eq!(record.total_days(99 * SECONDS_PER_DAY), 10);
    }

    #[test]
    fn test_total_days_is_at_least_one() {
        let record = LifeRecord::new(1_000);
        assert_eq!(record.total_days(1_060), 1);
    }
}
